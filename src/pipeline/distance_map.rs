// Distance map pipeline: topic-word table -> intertopic distance matrix.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SptmError};
use crate::table::labels::TopicLabels;
use crate::table::topic_words::TopicWordTable;
use crate::topics::distance::{DistanceMapper, DistanceMatrix};

/// Layout of the topic-word input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicWordFormat {
    /// One comma-delimited row of weights per topic
    #[default]
    Dense,
    /// Mallet `topic<TAB>word<TAB>weight` lines
    MalletWeights,
}

impl FromStr for TopicWordFormat {
    type Err = SptmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "mallet" | "mallet-weights" => Ok(Self::MalletWeights),
            other => Err(SptmError::Config(format!(
                "topic-word format must be \"dense\" or \"mallet\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for TopicWordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::MalletWeights => f.write_str("mallet"),
        }
    }
}

/// Input/output settings for one distance run.
#[derive(Debug, Clone, Default)]
pub struct DistancePaths {
    pub topics: PathBuf,
    pub format: TopicWordFormat,
    /// Normalize dense rows to sum to 1 (Mallet input is always normalized)
    pub normalize: bool,
    pub output: PathBuf,
    /// Prefix each output row with its topic index
    pub index_column: bool,
    /// Optional labels, used only for display
    pub labels: Option<PathBuf>,
}

/// Everything a distance run produced.
#[derive(Debug)]
pub struct DistanceReport {
    pub matrix: DistanceMatrix,
    pub measure: &'static str,
    pub labels: Option<TopicLabels>,
    pub diagnostics: Diagnostics,
}

/// Run the distance analysis end to end.
pub fn run(paths: &DistancePaths, config: &Config) -> Result<DistanceReport> {
    let (table, diagnostics) = match paths.format {
        TopicWordFormat::Dense => (
            TopicWordTable::load_dense(&paths.topics, paths.normalize)?,
            Diagnostics::new(),
        ),
        TopicWordFormat::MalletWeights => TopicWordTable::load_mallet_weights(&paths.topics)?,
    };

    let labels = paths
        .labels
        .as_deref()
        .map(TopicLabels::load)
        .transpose()?;

    let mapper = DistanceMapper::new(config);
    let matrix = mapper.compute(&table);
    matrix.save(&paths.output, paths.index_column)?;
    info!(path = %paths.output.display(), "Distance matrix saved");

    Ok(DistanceReport {
        matrix,
        measure: mapper.measure_name(),
        labels,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("Mallet".parse::<TopicWordFormat>().unwrap(), TopicWordFormat::MalletWeights);
        assert_eq!("dense".parse::<TopicWordFormat>().unwrap(), TopicWordFormat::Dense);
        assert!("xml".parse::<TopicWordFormat>().is_err());
    }
}
