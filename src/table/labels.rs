// Topic labels: the human-readable name of each topic index.
//
// The labels file is comma-delimited; the first column of row i is the label
// of topic i. The mapping is trusted as given: it is only checked for having
// enough rows when a matrix is labeled.

use std::path::Path;

use serde::Serialize;

use super::delimited::{self, ReadOptions};
use crate::error::{Result, SptmError};

/// Explicit topic-index → label mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicLabels {
    labels: Vec<String>,
}

impl TopicLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Load labels from the first column of each row.
    pub fn load(path: &Path) -> Result<Self> {
        let rows = delimited::load(path, ReadOptions::comma())?;
        let labels = rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect();
        Ok(Self { labels })
    }

    /// Label of a topic, or a missing-label error.
    pub fn get(&self, topic: usize) -> Result<&str> {
        self.labels
            .get(topic)
            .map(String::as_str)
            .ok_or(SptmError::MissingLabel {
                topic,
                available: self.labels.len(),
            })
    }

    /// Fail unless every topic in `0..num_topics` has a label.
    pub fn require(&self, num_topics: usize) -> Result<()> {
        if self.labels.len() < num_topics {
            return Err(SptmError::MissingLabel {
                topic: self.labels.len(),
                available: self.labels.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}
