// Diagnostics for recovered row-level problems.
//
// Malformed rows in the doc-index file, unusable weight rows, and skipped
// sentence pairs don't abort a run. Each one is logged as a warning and
// collected here so the caller can see exactly what the final matrix left out.

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// Which stage of processing produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Reading the document-index file
    DocIndex,
    /// Reading the doc-topic weight export
    DocTopics,
    /// Pairing sentences into transitions
    Transition,
    /// Reading a topic-word table
    TopicWords,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DocIndex => "doc-index",
            Stage::DocTopics => "doc-topics",
            Stage::Transition => "transition",
            Stage::TopicWords => "topic-words",
        };
        f.write_str(name)
    }
}

/// A single skipped row or pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    /// Zero-based row (or sentence) index the problem refers to
    pub row: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] row {}: {}", self.stage, self.row, self.message)
    }
}

/// Ordered list of diagnostics collected during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a warning.
    pub fn push(&mut self, stage: Stage, row: usize, message: impl Into<String>) {
        let message = message.into();
        warn!(stage = %stage, row, "{message}");
        self.entries.push(Diagnostic {
            stage,
            row,
            message,
        });
    }

    /// Append everything from another list, keeping order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics recorded for one stage.
    pub fn count(&self, stage: Stage) -> usize {
        self.entries.iter().filter(|d| d.stage == stage).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_count_by_stage() {
        let mut diags = Diagnostics::new();
        diags.push(Stage::DocIndex, 3, "not an integer");
        diags.push(Stage::Transition, 0, "skipped");
        diags.push(Stage::DocIndex, 7, "not an integer");

        assert_eq!(diags.len(), 3);
        assert_eq!(diags.count(Stage::DocIndex), 2);
        assert_eq!(diags.count(Stage::TopicWords), 0);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut a = Diagnostics::new();
        a.push(Stage::DocIndex, 1, "first");
        let mut b = Diagnostics::new();
        b.push(Stage::Transition, 2, "second");
        a.extend(b);

        let rows: Vec<usize> = a.iter().map(|d| d.row).collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_display_format() {
        let d = Diagnostic {
            stage: Stage::DocTopics,
            row: 4,
            message: "bad weight".to_string(),
        };
        assert_eq!(d.to_string(), "[doc-topics] row 4: bad weight");
    }
}
