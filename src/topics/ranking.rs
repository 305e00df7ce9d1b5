// Label and rank the conditional matrix.
//
// Each topic gets a record of its own label plus its conditional weight
// toward every topic, addressed by topic index and displayed by label. The
// sorted view orders those num_topics + 1 entries ascending by value with a
// stable sort: weights first (ties keep topic order), the own-label entry
// last since it carries text rather than a number.

use std::cmp::Ordering;
use std::path::Path;

use serde::Serialize;

use super::conditional::ConditionalMatrix;
use crate::error::Result;
use crate::table::delimited::{self, format_float};
use crate::table::labels::TopicLabels;

/// Key under which the own label is stored in each topic's record.
pub const OWN_LABEL_KEY: &str = "label";

/// Position in a topic's record: its own label, or the weight toward a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    OwnLabel,
    Topic(usize),
}

/// Value of a record entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RankValue<'a> {
    Weight(f64),
    Label(&'a str),
}

/// One resolved entry of a topic's record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedEntry<'a> {
    pub key: &'a str,
    pub value: RankValue<'a>,
}

/// Conditional matrix with labels attached and a per-topic sorted view.
///
/// An independent snapshot; the source matrix is not touched.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    labels: Vec<String>,
    weights: Vec<Vec<f64>>,
    order: Vec<Vec<RankKey>>,
}

/// Attach labels to a conditional matrix and sort each topic's record.
///
/// Fails with a missing-label error if any topic index has no label.
/// Labels beyond the number of topics are ignored.
pub fn label_and_sort(matrix: &ConditionalMatrix, labels: &TopicLabels) -> Result<LabeledMatrix> {
    let n = matrix.num_topics();
    labels.require(n)?;

    let labels: Vec<String> = labels.as_slice()[..n].to_vec();
    let weights: Vec<Vec<f64>> = matrix.rows().to_vec();

    let order = weights.iter().map(|row| sort_record(row)).collect();

    Ok(LabeledMatrix {
        labels,
        weights,
        order,
    })
}

/// Keys of one topic's record in ascending weight order, own label last.
fn sort_record(row: &[f64]) -> Vec<RankKey> {
    let mut keys: Vec<RankKey> = std::iter::once(RankKey::OwnLabel)
        .chain((0..row.len()).map(RankKey::Topic))
        .collect();
    // sort_by is stable, so equal weights keep insertion order
    keys.sort_by(|a, b| compare_keys(row, *a, *b));
    keys
}

fn compare_keys(row: &[f64], a: RankKey, b: RankKey) -> Ordering {
    match (a, b) {
        // 0.0 and -0.0 tie; a NaN falls back to total_cmp so the order stays total
        (RankKey::Topic(i), RankKey::Topic(j)) => row[i]
            .partial_cmp(&row[j])
            .unwrap_or_else(|| row[i].total_cmp(&row[j])),
        (RankKey::OwnLabel, RankKey::Topic(_)) => Ordering::Greater,
        (RankKey::Topic(_), RankKey::OwnLabel) => Ordering::Less,
        (RankKey::OwnLabel, RankKey::OwnLabel) => Ordering::Equal,
    }
}

impl LabeledMatrix {
    pub fn num_topics(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, topic: usize) -> &str {
        &self.labels[topic]
    }

    /// Conditional weight of `next` following `topic`.
    pub fn weight(&self, topic: usize, next: usize) -> f64 {
        self.weights[topic][next]
    }

    /// The sorted keys of a topic's record.
    pub fn order(&self, topic: usize) -> &[RankKey] {
        &self.order[topic]
    }

    /// A topic's record entries in ascending order, resolved to labels.
    pub fn sorted(&self, topic: usize) -> Vec<RankedEntry<'_>> {
        self.order[topic]
            .iter()
            .map(|key| self.resolve(topic, *key))
            .collect()
    }

    /// A topic's record in insertion order: own label, then every topic.
    pub fn labeled(&self, topic: usize) -> Vec<RankedEntry<'_>> {
        std::iter::once(RankKey::OwnLabel)
            .chain((0..self.num_topics()).map(RankKey::Topic))
            .map(|key| self.resolve(topic, key))
            .collect()
    }

    /// The `n` strongest outgoing transitions of a topic, strongest first.
    pub fn top_transitions(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        self.order[topic]
            .iter()
            .rev()
            .filter_map(|key| match key {
                RankKey::Topic(j) => Some((*j, self.weights[topic][*j])),
                RankKey::OwnLabel => None,
            })
            .take(n)
            .collect()
    }

    fn resolve(&self, topic: usize, key: RankKey) -> RankedEntry<'_> {
        match key {
            RankKey::OwnLabel => RankedEntry {
                key: OWN_LABEL_KEY,
                value: RankValue::Label(&self.labels[topic]),
            },
            RankKey::Topic(j) => RankedEntry {
                key: &self.labels[j],
                value: RankValue::Weight(self.weights[topic][j]),
            },
        }
    }

    /// Sorted view as delimited rows: alternating key and value fields.
    pub fn sorted_rows(&self) -> Vec<Vec<String>> {
        (0..self.num_topics())
            .map(|topic| {
                self.sorted(topic)
                    .into_iter()
                    .flat_map(|entry| {
                        let value = match entry.value {
                            RankValue::Weight(w) => format_float(w),
                            RankValue::Label(l) => l.to_string(),
                        };
                        [entry.key.to_string(), value]
                    })
                    .collect()
            })
            .collect()
    }

    pub fn save_sorted(&self, path: &Path) -> Result<()> {
        delimited::save(path, &self.sorted_rows())
    }

    /// JSON export: per topic, its label, its labeled weights and its
    /// sorted record.
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct TopicExport<'a> {
            topic: usize,
            label: &'a str,
            labeled: Vec<RankedEntry<'a>>,
            sorted: Vec<RankedEntry<'a>>,
        }

        let topics: Vec<TopicExport<'_>> = (0..self.num_topics())
            .map(|topic| TopicExport {
                topic,
                label: self.label(topic),
                labeled: self.labeled(topic),
                sorted: self.sorted(topic),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&topics)?)
    }
}
