// Intertopic distance map.
//
// Every topic is a probability distribution over the vocabulary. The mapper
// computes the distance between every pair of topics, once per unordered
// pair, and mirrors it, so the matrix is exactly symmetric with a zero
// diagonal. The result feeds an external 2-D embedding for plotting.
//
// Hellinger distance:
//
//   H(P, Q) = sqrt( 0.5 * sum_k (sqrt(P_k) - sqrt(Q_k))^2 )
//
// It lies in [0, 1] for proper distributions. Rows that don't sum to 1 still
// produce a number, just not a calibrated one; the mapper doesn't judge.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use super::traits::TopicDistance;
use crate::config::Config;
use crate::error::{Result, SptmError};
use crate::table::delimited;
use crate::table::topic_words::TopicWordTable;

/// Hellinger distance between two distributions.
pub fn hellinger(p: &[f64], q: &[f64]) -> f64 {
    let sum: f64 = p
        .iter()
        .zip(q)
        .map(|(a, b)| {
            let d = a.sqrt() - b.sqrt();
            d * d
        })
        .sum();
    (0.5 * sum).sqrt()
}

/// Jensen-Shannon distance (square root of the base-2 JS divergence).
pub fn jensen_shannon(p: &[f64], q: &[f64]) -> f64 {
    // Terms with a zero probability contribute nothing (0 * log 0 = 0)
    let kl_to_mid = |x: f64, m: f64| if x > 0.0 { x * (x / m).log2() } else { 0.0 };

    let divergence: f64 = p
        .iter()
        .zip(q)
        .map(|(&a, &b)| {
            let m = 0.5 * (a + b);
            0.5 * kl_to_mid(a, m) + 0.5 * kl_to_mid(b, m)
        })
        .sum();
    divergence.max(0.0).sqrt()
}

/// Hellinger distance as a `TopicDistance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hellinger;

impl TopicDistance for Hellinger {
    fn name(&self) -> &'static str {
        "hellinger"
    }

    fn distance(&self, p: &[f64], q: &[f64]) -> f64 {
        hellinger(p, q)
    }
}

/// Jensen-Shannon distance as a `TopicDistance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JensenShannon;

impl TopicDistance for JensenShannon {
    fn name(&self) -> &'static str {
        "jensen-shannon"
    }

    fn distance(&self, p: &[f64], q: &[f64]) -> f64 {
        jensen_shannon(p, q)
    }
}

/// Which distance measure to use, as chosen in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMeasure {
    Hellinger,
    JensenShannon,
}

impl DistanceMeasure {
    pub fn boxed(self) -> Box<dyn TopicDistance> {
        match self {
            Self::Hellinger => Box::new(Hellinger),
            Self::JensenShannon => Box::new(JensenShannon),
        }
    }
}

impl FromStr for DistanceMeasure {
    type Err = SptmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hellinger" => Ok(Self::Hellinger),
            "jensen-shannon" | "js" => Ok(Self::JensenShannon),
            other => Err(SptmError::Config(format!(
                "distance measure must be \"hellinger\" or \"jensen-shannon\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.boxed().name())
    }
}

/// Symmetric topic × topic distance matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    pub fn num_topics(&self) -> usize {
        self.distances.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.distances
    }

    /// The `n` closest other topics to `topic`, nearest first.
    pub fn nearest(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        let mut others: Vec<(usize, f64)> = self.distances[topic]
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != topic)
            .collect();
        others.sort_by(|a, b| a.1.total_cmp(&b.1));
        others.truncate(n);
        others
    }

    /// Rows prefixed with their topic index, the layout plotting tools read.
    pub fn with_index_column(&self) -> Vec<Vec<f64>> {
        self.distances
            .iter()
            .enumerate()
            .map(|(i, row)| std::iter::once(i as f64).chain(row.iter().copied()).collect())
            .collect()
    }

    /// Write the matrix, optionally with the leading topic index column.
    pub fn save(&self, path: &Path, index_column: bool) -> Result<()> {
        if index_column {
            delimited::save(path, &self.with_index_column())
        } else {
            delimited::save(path, &self.distances)
        }
    }
}

/// Computes pairwise distances between topic-word distributions.
pub struct DistanceMapper {
    distance: Box<dyn TopicDistance>,
}

impl Default for DistanceMapper {
    fn default() -> Self {
        Self::with_distance(Box::new(Hellinger))
    }
}

impl DistanceMapper {
    pub fn new(config: &Config) -> Self {
        Self::with_distance(config.measure.boxed())
    }

    pub fn with_distance(distance: Box<dyn TopicDistance>) -> Self {
        Self { distance }
    }

    pub fn measure_name(&self) -> &'static str {
        self.distance.name()
    }

    pub fn compute(&self, topics: &TopicWordTable) -> DistanceMatrix {
        let rows = topics.topics();
        let n = rows.len();
        let mut distances = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance.distance(&rows[i], &rows[j]);
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }

        info!(
            topics = n,
            vocab = topics.vocab_size(),
            measure = self.distance.name(),
            "Computed intertopic distances"
        );
        DistanceMatrix { distances }
    }
}
