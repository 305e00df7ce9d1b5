// Transition pipeline: doc-topic export -> conditional matrix -> labeled ranking.
//
// 1. Load the doc-topic export and the document index into a TopicTable
// 2. Estimate the topic transition matrix
// 3. Write it out
// 4. If a labels file is given, label and sort each topic's record and
//    optionally write the sorted view and a JSON export

use std::path::PathBuf;

use tracing::info;

use super::write_output;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SptmError};
use crate::table::labels::TopicLabels;
use crate::table::topic_table::TopicTable;
use crate::topics::conditional::{ConditionalEstimator, ConditionalMatrix};
use crate::topics::ranking::{label_and_sort, LabeledMatrix};

/// Input and output locations for one transition run.
#[derive(Debug, Clone, Default)]
pub struct TransitionPaths {
    /// Tab-delimited doc-topic export
    pub doc_topics: PathBuf,
    /// Comma-delimited document index, one row per sentence
    pub doc_index: PathBuf,
    /// Optional labels file, one topic per row
    pub labels: Option<PathBuf>,
    /// Where the conditional matrix is written
    pub output: PathBuf,
    /// Where the sorted per-topic view is written (needs labels)
    pub sorted_output: Option<PathBuf>,
    /// Where the JSON export of the labeled matrix is written (needs labels)
    pub json_output: Option<PathBuf>,
}

/// Everything a transition run produced.
#[derive(Debug, Clone)]
pub struct TransitionReport {
    pub sentences: usize,
    pub matrix: ConditionalMatrix,
    pub labeled: Option<LabeledMatrix>,
    pub diagnostics: Diagnostics,
}

/// Run the transition analysis end to end.
pub fn run(paths: &TransitionPaths, config: &Config) -> Result<TransitionReport> {
    config.validate()?;
    if paths.labels.is_none() && (paths.sorted_output.is_some() || paths.json_output.is_some()) {
        return Err(SptmError::Config(
            "sorted and JSON outputs need a labels file".to_string(),
        ));
    }

    let (table, mut diagnostics) = TopicTable::load(&paths.doc_topics, &paths.doc_index, config)?;

    let estimator = ConditionalEstimator::new(config);
    let matrix = estimator.construct(&table, &mut diagnostics);
    matrix.save(&paths.output)?;
    info!(path = %paths.output.display(), "Conditional matrix saved");

    let labeled = match &paths.labels {
        Some(labels_path) => {
            let labels = TopicLabels::load(labels_path)?;
            let labeled = label_and_sort(&matrix, &labels)?;

            if let Some(sorted_path) = &paths.sorted_output {
                labeled.save_sorted(sorted_path)?;
                info!(path = %sorted_path.display(), "Sorted view saved");
            }
            if let Some(json_path) = &paths.json_output {
                write_output(json_path, &labeled.to_json()?)?;
                info!(path = %json_path.display(), "JSON export saved");
            }
            Some(labeled)
        }
        None => None,
    };

    Ok(TransitionReport {
        sentences: table.len(),
        matrix,
        labeled,
        diagnostics,
    })
}
