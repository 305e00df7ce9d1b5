// Topic transition estimator: how likely topic B is in the next sentence
// given topic A in the current one, within the same document.
//
// For every pair of consecutive sentences that share a document id, each
// (current topic x, next topic y) cell accumulates weight_next[y] * weight_curr[x].
// Row x is then divided by the accumulated mass of topic x in the current
// sentences and multiplied by a fixed output scale.
//
// How that mass is accumulated is configurable. The literal mode adds
// weight_curr[x] once per (x, y) cell, i.e. num_topics times per observed
// transition, which is what existing outputs were produced with. The
// corrected mode adds it once per transition. Literal rows come out exactly
// num_topics times smaller than corrected ones.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::{Result, SptmError};
use crate::table::delimited;
use crate::table::topic_table::TopicTable;

/// How the per-topic normalizing mass is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accumulation {
    /// Once per (current, next) topic cell, the output-compatible default
    Literal,
    /// Once per observed transition
    Corrected,
}

impl FromStr for Accumulation {
    type Err = SptmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "corrected" => Ok(Self::Corrected),
            other => Err(SptmError::Config(format!(
                "accumulation must be \"literal\" or \"corrected\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Accumulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::Corrected => f.write_str("corrected"),
        }
    }
}

/// Topic × topic conditional weights. Row = current topic, column = next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalMatrix {
    freq: Vec<Vec<f64>>,
    topic_total: Vec<f64>,
    /// Number of sentence pairs that contributed
    observations: usize,
    accumulation: Accumulation,
    scale: f64,
}

impl ConditionalMatrix {
    pub fn num_topics(&self) -> usize {
        self.freq.len()
    }

    /// Conditional weight of `next` following `current`.
    pub fn get(&self, current: usize, next: usize) -> f64 {
        self.freq[current][next]
    }

    pub fn row(&self, current: usize) -> &[f64] {
        &self.freq[current]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.freq
    }

    /// Normalizing mass accumulated for each current topic.
    pub fn topic_total(&self) -> &[f64] {
        &self.topic_total
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn accumulation(&self) -> Accumulation {
        self.accumulation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Write the matrix as comma-delimited rows.
    pub fn save(&self, path: &Path) -> Result<()> {
        delimited::save(path, &self.freq)
    }
}

/// Builds a `ConditionalMatrix` from a `TopicTable`.
#[derive(Debug, Clone)]
pub struct ConditionalEstimator {
    pub scale: f64,
    pub accumulation: Accumulation,
}

impl Default for ConditionalEstimator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl ConditionalEstimator {
    pub fn new(config: &Config) -> Self {
        Self {
            scale: config.scale,
            accumulation: config.accumulation,
        }
    }

    /// Accumulate every same-document sentence pair, then normalize.
    ///
    /// Pairs touching an unusable row are skipped and reported in
    /// `diagnostics`; everything else still counts.
    pub fn construct(&self, table: &TopicTable, diagnostics: &mut Diagnostics) -> ConditionalMatrix {
        let n = table.num_topics();
        let mut freq = vec![vec![0.0_f64; n]; n];
        let mut topic_total = vec![0.0_f64; n];
        let mut observations = 0;

        for (i, pair) in table.rows().windows(2).enumerate() {
            let (curr, next) = (&pair[0], &pair[1]);
            if curr.doc_id != next.doc_id {
                continue;
            }

            let (Some(curr_w), Some(next_w)) = (&curr.weights, &next.weights) else {
                diagnostics.push(
                    Stage::Transition,
                    i,
                    format!(
                        "sentence pair ({i}, {}) in document {} skipped: unusable weights",
                        i + 1,
                        curr.doc_id
                    ),
                );
                continue;
            };

            self.accumulate(curr_w, next_w, &mut freq, &mut topic_total);
            observations += 1;
        }

        debug!(observations, "Accumulated topic transitions");

        for (row, &total) in freq.iter_mut().zip(&topic_total) {
            if total != 0.0 {
                for cell in row.iter_mut() {
                    *cell = (*cell / total) * self.scale;
                }
            }
        }

        info!(
            topics = n,
            observations,
            accumulation = %self.accumulation,
            scale = self.scale,
            "Constructed conditional matrix"
        );

        ConditionalMatrix {
            freq,
            topic_total,
            observations,
            accumulation: self.accumulation,
            scale: self.scale,
        }
    }

    fn accumulate(
        &self,
        curr: &[f64],
        next: &[f64],
        freq: &mut [Vec<f64>],
        topic_total: &mut [f64],
    ) {
        for (x, &cx) in curr.iter().enumerate() {
            for (y, &ny) in next.iter().enumerate() {
                freq[x][y] += ny * cx;
                if self.accumulation == Accumulation::Literal {
                    topic_total[x] += cx;
                }
            }
            if self.accumulation == Accumulation::Corrected {
                topic_total[x] += cx;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(i64, &[f64])]) -> TopicTable {
        TopicTable::new(rows.iter().map(|(d, w)| (*d, w.to_vec())).collect()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_transition_literal() {
        let t = table(&[(1, &[0.9, 0.1]), (1, &[0.2, 0.8]), (2, &[0.5, 0.5])]);
        let mut diags = Diagnostics::new();
        let m = ConditionalEstimator::default().construct(&t, &mut diags);

        assert_eq!(m.observations(), 1);
        // Literal mode adds each current weight once per next topic (2 here)
        assert!(approx(m.topic_total()[0], 1.8));
        assert!(approx(m.topic_total()[1], 0.2));
        // 0.72 / 1.8 * 65 = 26
        assert!(approx(m.get(0, 1), 26.0));
        assert!(approx(m.get(0, 0), 6.5));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_single_transition_corrected() {
        let t = table(&[(1, &[0.9, 0.1]), (1, &[0.2, 0.8])]);
        let estimator = ConditionalEstimator {
            scale: 65.0,
            accumulation: Accumulation::Corrected,
        };
        let m = estimator.construct(&t, &mut Diagnostics::new());

        assert!(approx(m.topic_total()[0], 0.9));
        assert!(approx(m.get(0, 1), 52.0));
        assert!(approx(m.get(1, 0), 13.0));
    }

    #[test]
    fn test_zero_mass_row_stays_zero() {
        let t = table(&[(1, &[1.0, 0.0]), (1, &[0.0, 1.0])]);
        let m = ConditionalEstimator::default().construct(&t, &mut Diagnostics::new());

        assert_eq!(m.row(1), &[0.0, 0.0]);
        assert!(m.rows().iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_no_transitions_across_documents() {
        let t = table(&[(1, &[1.0]), (2, &[1.0]), (3, &[1.0])]);
        let m = ConditionalEstimator::default().construct(&t, &mut Diagnostics::new());
        assert_eq!(m.observations(), 0);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn test_accumulation_from_str() {
        assert_eq!("Corrected".parse::<Accumulation>().unwrap(), Accumulation::Corrected);
        assert_eq!("literal".parse::<Accumulation>().unwrap(), Accumulation::Literal);
        assert!("sometimes".parse::<Accumulation>().is_err());
    }
}
