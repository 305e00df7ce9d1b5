// TopicWordTable: each topic's probability distribution over the vocabulary.
//
// Two input layouts are supported:
//   - dense: one comma-delimited row per topic, one weight per vocabulary word
//   - Mallet word weights: `topic<TAB>word<TAB>weight` lines, as written by
//     `mallet train-topics --topic-word-weights-file`
//
// Mallet weights are smoothed word counts, so rows are normalized to sum to 1
// before they are compared. Dense rows are normalized only on request.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::info;

use super::delimited::{self, ReadOptions};
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::{Result, SptmError};

/// Topic × vocabulary weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicWordTable {
    topics: Vec<Vec<f64>>,
    /// Column words, when the input format names them
    vocabulary: Option<Vec<String>>,
}

impl TopicWordTable {
    /// Build a table from dense rows.
    ///
    /// Rows must be non-empty and all the same width; every weight must be
    /// finite and non-negative.
    pub fn new(topics: Vec<Vec<f64>>) -> Result<Self> {
        let width = match topics.first() {
            Some(row) if !row.is_empty() => row.len(),
            Some(_) => return Err(SptmError::Shape("topic-word rows are empty".to_string())),
            None => return Err(SptmError::Shape("topic-word table has no topics".to_string())),
        };

        for (r, row) in topics.iter().enumerate() {
            if row.len() != width {
                return Err(SptmError::Shape(format!(
                    "topic {r} has {} word weights, expected {width}",
                    row.len()
                )));
            }
            if let Some((c, v)) = row
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(SptmError::InvalidValue {
                    row: r,
                    column: c,
                    value: v.to_string(),
                });
            }
        }

        Ok(Self {
            topics,
            vocabulary: None,
        })
    }

    /// Load a dense comma-delimited topic × vocabulary matrix.
    pub fn load_dense(path: &Path, normalize: bool) -> Result<Self> {
        let rows = delimited::load(path, ReadOptions::comma())?;
        let mut table = Self::new(delimited::parse_matrix(&rows)?)?;
        if normalize {
            table.normalize();
        }
        info!(
            topics = table.num_topics(),
            vocab = table.vocab_size(),
            "Loaded dense topic-word table"
        );
        Ok(table)
    }

    /// Load a Mallet topic-word-weights file and normalize each topic.
    ///
    /// Malformed lines are skipped with a diagnostic. Vocabulary columns are
    /// assigned in first-seen order; a word listed twice for one topic has
    /// its weights summed. Topic indices must cover `0..k` without gaps.
    pub fn load_mallet_weights(path: &Path) -> Result<(Self, Diagnostics)> {
        let rows = delimited::load(path, ReadOptions::tab())?;
        let mut diagnostics = Diagnostics::new();

        let mut vocab_index: HashMap<String, usize> = HashMap::new();
        let mut vocabulary: Vec<String> = Vec::new();
        let mut entries: Vec<(usize, usize, f64)> = Vec::with_capacity(rows.len());

        for (line, row) in rows.iter().enumerate() {
            let [topic, word, weight] = row.as_slice() else {
                diagnostics.push(
                    Stage::TopicWords,
                    line,
                    format!("expected 3 fields, found {}", row.len()),
                );
                continue;
            };
            let Ok(topic) = topic.trim().parse::<usize>() else {
                diagnostics.push(Stage::TopicWords, line, format!("bad topic index {topic:?}"));
                continue;
            };
            let weight = match weight.trim().parse::<f64>() {
                Ok(w) if w.is_finite() && w >= 0.0 => w,
                _ => {
                    diagnostics.push(Stage::TopicWords, line, format!("bad weight {weight:?}"));
                    continue;
                }
            };

            let column = *vocab_index.entry(word.clone()).or_insert_with(|| {
                vocabulary.push(word.clone());
                vocabulary.len() - 1
            });
            entries.push((topic, column, weight));
        }

        let seen: BTreeSet<usize> = entries.iter().map(|(t, _, _)| *t).collect();
        let num_topics = contiguous_topic_count(&seen)?;

        let mut topics = vec![vec![0.0; vocabulary.len()]; num_topics];
        for (topic, column, weight) in entries {
            topics[topic][column] += weight;
        }

        let mut table = Self {
            topics,
            vocabulary: Some(vocabulary),
        };
        table.normalize();

        info!(
            topics = table.num_topics(),
            vocab = table.vocab_size(),
            skipped = diagnostics.len(),
            "Loaded Mallet topic-word weights"
        );
        Ok((table, diagnostics))
    }

    /// Divide every row by its sum. All-zero rows are left as they are.
    pub fn normalize(&mut self) {
        for row in &mut self.topics {
            let sum: f64 = row.iter().sum();
            if sum > 0.0 {
                for v in row.iter_mut() {
                    *v /= sum;
                }
            }
        }
    }

    pub fn num_topics(&self) -> usize {
        self.topics.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.topics.first().map_or(0, Vec::len)
    }

    pub fn topics(&self) -> &[Vec<f64>] {
        &self.topics
    }

    pub fn vocabulary(&self) -> Option<&[String]> {
        self.vocabulary.as_deref()
    }
}

/// Number of topics named by `seen`, which must be exactly `0..k`.
fn contiguous_topic_count(seen: &BTreeSet<usize>) -> Result<usize> {
    let Some(&max) = seen.last() else {
        return Err(SptmError::Shape("no usable topic-word weights".to_string()));
    };
    if max >= seen.len() {
        let first_missing = (0..).find(|t| !seen.contains(t)).unwrap_or(max);
        return Err(SptmError::Shape(format!(
            "topic indices are not contiguous: {} distinct topics up to index {max}, \
             {} missing, first missing is {first_missing}",
            seen.len(),
            max + 1 - seen.len()
        )));
    }
    Ok(seen.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_and_nan() {
        assert!(matches!(
            TopicWordTable::new(vec![vec![0.5, -0.1]]),
            Err(SptmError::InvalidValue { row: 0, column: 1, .. })
        ));
        assert!(TopicWordTable::new(vec![vec![f64::NAN]]).is_err());
    }

    #[test]
    fn test_new_rejects_ragged() {
        assert!(matches!(
            TopicWordTable::new(vec![vec![0.5, 0.5], vec![1.0]]),
            Err(SptmError::Shape(_))
        ));
    }

    #[test]
    fn test_normalize_leaves_zero_rows() {
        let mut table = TopicWordTable::new(vec![vec![2.0, 6.0], vec![0.0, 0.0]]).unwrap();
        table.normalize();
        assert_eq!(table.topics()[0], vec![0.25, 0.75]);
        assert_eq!(table.topics()[1], vec![0.0, 0.0]);
    }

    #[test]
    fn test_load_mallet_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.txt");
        std::fs::write(
            &path,
            "0\tfood\t3.0\n0\tstaff\t1.0\n1\tstaff\t2.0\n1\tfood\t0.0\nbroken line\n1\troom\t2.0\n",
        )
        .unwrap();

        let (table, diags) = TopicWordTable::load_mallet_weights(&path).unwrap();
        assert_eq!(table.num_topics(), 2);
        assert_eq!(
            table.vocabulary().unwrap(),
            ["food".to_string(), "staff".to_string(), "room".to_string()]
        );
        assert_eq!(table.topics()[0], vec![0.75, 0.25, 0.0]);
        assert_eq!(table.topics()[1], vec![0.0, 0.5, 0.5]);
        assert_eq!(diags.len(), 1);
    }

    fn write_weights(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_mallet_huge_topic_index_is_rejected() {
        let (_dir, path) = write_weights("0\tfood\t1.0\n1\tfood\t2.0\n4000000000\tw\t1.0\n");
        match TopicWordTable::load_mallet_weights(&path) {
            Err(SptmError::Shape(message)) => assert!(message.contains("4000000000"), "{message}"),
            other => panic!("expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn test_mallet_missing_topic_index_is_rejected() {
        let (_dir, path) = write_weights("0\tfood\t1.0\n2\tfood\t2.0\n3\troom\t1.0\n");
        match TopicWordTable::load_mallet_weights(&path) {
            Err(SptmError::Shape(message)) => {
                assert!(message.contains("first missing is 1"), "{message}")
            }
            other => panic!("expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn test_contiguous_topic_count() {
        let seen: BTreeSet<usize> = [2, 0, 1].into_iter().collect();
        assert_eq!(contiguous_topic_count(&seen).unwrap(), 3);
        assert!(contiguous_topic_count(&BTreeSet::new()).is_err());
    }
}
