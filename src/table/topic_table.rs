// TopicTable: per-sentence topic weights tagged with their document id.
//
// Built from two aligned files: the doc-topic export (tab-delimited, one row
// per sentence, first two columns are metadata) and the document-index file
// (comma-delimited, first column is the integer document id of each
// sentence). Row k of the export belongs to the k-th document id that parsed.
//
// Adjacency is positional: two consecutive rows with the same doc id are
// consecutive sentences of one document. Rows that can't be used are kept in
// place (marked unusable) so positions never shift.

use std::path::Path;

use tracing::info;

use super::delimited::{self, ReadOptions};
use crate::config::Config;
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::{Result, SptmError};

/// Number of leading metadata columns in a doc-topic export row
/// (document number and document name).
pub const METADATA_COLUMNS: usize = 2;

/// One sentence: its document and its topic weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRow {
    pub doc_id: i64,
    /// `None` when the row's weights couldn't be parsed or had the wrong width
    pub weights: Option<Vec<f64>>,
}

/// Ordered per-sentence topic weights. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicTable {
    num_topics: usize,
    rows: Vec<SentenceRow>,
}

impl TopicTable {
    /// Build a table from in-memory rows, all of which must be usable:
    /// the same width and finite weights throughout.
    pub fn new(rows: Vec<(i64, Vec<f64>)>) -> Result<Self> {
        let num_topics = match rows.first() {
            Some((_, weights)) => weights.len(),
            None => return Err(SptmError::Shape("topic table has no rows".to_string())),
        };
        if num_topics == 0 {
            return Err(SptmError::Shape("topic table has zero topics".to_string()));
        }

        if let Some((k, (_, w))) = rows
            .iter()
            .enumerate()
            .find(|(_, (_, w))| w.len() != num_topics)
        {
            return Err(SptmError::Shape(format!(
                "row {k} has {} topic weights, expected {num_topics}",
                w.len()
            )));
        }

        for (k, (_, weights)) in rows.iter().enumerate() {
            if let Some((c, v)) = weights.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(SptmError::InvalidValue {
                    row: k,
                    column: c,
                    value: v.to_string(),
                });
            }
        }

        Ok(Self {
            num_topics,
            rows: rows
                .into_iter()
                .map(|(doc_id, weights)| SentenceRow {
                    doc_id,
                    weights: Some(weights),
                })
                .collect(),
        })
    }

    /// Load and align the doc-topic export and the document-index file.
    ///
    /// Row-level problems are recovered and returned as diagnostics. A row
    /// of the wrong width is a shape error unless `config.allow_partial`.
    pub fn load(
        doc_topics_path: &Path,
        doc_index_path: &Path,
        config: &Config,
    ) -> Result<(Self, Diagnostics)> {
        let doc_topic_rows = delimited::load(
            doc_topics_path,
            ReadOptions {
                comment: Some(b'#'),
                ..ReadOptions::tab()
            },
        )?;
        let index_rows = delimited::load(
            doc_index_path,
            ReadOptions {
                strip_nul: true,
                ..ReadOptions::comma()
            },
        )?;

        let mut diagnostics = Diagnostics::new();
        let doc_ids = parse_doc_index(&index_rows, &mut diagnostics);
        let table = Self::from_fields(
            &doc_topic_rows,
            &doc_ids,
            config.allow_partial,
            &mut diagnostics,
        )?;

        info!(
            sentences = table.len(),
            topics = table.num_topics(),
            skipped = diagnostics.len(),
            "Loaded topic table"
        );
        Ok((table, diagnostics))
    }

    /// Align raw doc-topic fields with parsed document ids.
    pub fn from_fields(
        doc_topic_rows: &[Vec<String>],
        doc_ids: &[i64],
        allow_partial: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let first = doc_topic_rows
            .first()
            .ok_or_else(|| SptmError::Shape("doc-topic file has no rows".to_string()))?;
        let num_topics = first.len().saturating_sub(METADATA_COLUMNS);
        if num_topics == 0 {
            return Err(SptmError::Shape(format!(
                "doc-topic rows need at least one weight after the {METADATA_COLUMNS} metadata columns"
            )));
        }

        let mut rows = Vec::with_capacity(doc_topic_rows.len().min(doc_ids.len()));
        for (k, fields) in doc_topic_rows.iter().enumerate() {
            let Some(&doc_id) = doc_ids.get(k) else {
                diagnostics.push(
                    Stage::DocTopics,
                    k,
                    format!(
                        "{} sentences from here on have no document id and are left out",
                        doc_topic_rows.len() - k
                    ),
                );
                break;
            };

            let width = fields.len().saturating_sub(METADATA_COLUMNS);
            let weights = if width != num_topics {
                if !allow_partial {
                    return Err(SptmError::Shape(format!(
                        "doc-topic row {k} has {width} topic weights, expected {num_topics}"
                    )));
                }
                diagnostics.push(
                    Stage::DocTopics,
                    k,
                    format!("{width} topic weights, expected {num_topics}"),
                );
                None
            } else {
                match parse_weights(&fields[METADATA_COLUMNS..]) {
                    Ok(weights) => Some(weights),
                    Err(message) => {
                        diagnostics.push(Stage::DocTopics, k, message);
                        None
                    }
                }
            };

            rows.push(SentenceRow { doc_id, weights });
        }

        if doc_ids.len() > doc_topic_rows.len() {
            diagnostics.push(
                Stage::DocIndex,
                doc_topic_rows.len(),
                format!(
                    "{} document ids beyond the last sentence are ignored",
                    doc_ids.len() - doc_topic_rows.len()
                ),
            );
        }

        Ok(Self { num_topics, rows })
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Number of sentences (`num_sent`).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SentenceRow] {
        &self.rows
    }
}

/// Read the document id of every sentence from the document-index rows.
///
/// The id is the first column. Rows whose first column isn't an integer are
/// skipped with a diagnostic, so later ids move up one position.
pub fn parse_doc_index(rows: &[Vec<String>], diagnostics: &mut Diagnostics) -> Vec<i64> {
    let mut ids = Vec::with_capacity(rows.len());
    for (line, row) in rows.iter().enumerate() {
        let Some(first) = row.first() else {
            continue;
        };
        match first.trim().parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(e) => diagnostics.push(
                Stage::DocIndex,
                line,
                format!("document id {first:?} is not an integer ({e})"),
            ),
        }
    }
    ids
}

/// Parse one row of topic weights. `nan` and `inf` spellings are refused
/// along with anything else that isn't a finite number.
fn parse_weights(cells: &[String]) -> std::result::Result<Vec<f64>, String> {
    cells
        .iter()
        .enumerate()
        .map(|(topic, cell)| match cell.trim().parse::<f64>() {
            Ok(weight) if weight.is_finite() => Ok(weight),
            _ => Err(format!("weight for topic {topic} is not a finite number: {cell:?}")),
        })
        .collect()
}
