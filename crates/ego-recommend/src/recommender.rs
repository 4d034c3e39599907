//! Measure-based recommendation ranking.
//!
//! Score: `score = measure_value / max(measure_value) × max_score`, so the
//! top-ranked account always scores `max_score`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of a network measures table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMeasure {
    pub measure_name: String,
    pub node: String,
    pub measure_value: f64,
}

/// A ranked account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub node: String,
    /// The raw measure, unmodified.
    pub measure_value: f64,
    /// Normalized to `[0, max_score]`.
    pub score: f64,
}

/// Ranking configuration parameters.
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Measure to rank by (default "pagerank").
    pub measure_name: String,
    /// Score ceiling (default 10.0).
    pub max_score: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            measure_name: "pagerank".to_string(),
            max_score: 10.0,
        }
    }
}

pub struct EgoNetworkRecommender {
    measures: Vec<NetworkMeasure>,
    config: RecommenderConfig,
    excluded: HashSet<String>,
}

impl EgoNetworkRecommender {
    pub fn new(measures: Vec<NetworkMeasure>) -> Self {
        Self::with_config(measures, RecommenderConfig::default())
    }

    pub fn with_config(measures: Vec<NetworkMeasure>, config: RecommenderConfig) -> Self {
        Self {
            measures,
            config,
            excluded: HashSet::new(),
        }
    }

    /// Leave these nodes out of the ranking (e.g. accounts already followed).
    pub fn exclude<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Rank the configured measure, highest first. Ties are ordered by node.
    pub fn train(&self) -> Vec<Recommendation> {
        let mut ranked: Vec<&NetworkMeasure> = self
            .measures
            .iter()
            .filter(|m| m.measure_name == self.config.measure_name)
            .filter(|m| !self.excluded.contains(&m.node))
            .collect();

        ranked.sort_by(|a, b| {
            b.measure_value
                .partial_cmp(&a.measure_value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.node.cmp(&b.node))
        });

        let max = ranked
            .first()
            .map(|m| m.measure_value)
            .unwrap_or(0.0);

        tracing::debug!(
            measure = %self.config.measure_name,
            candidates = ranked.len(),
            excluded = self.excluded.len(),
            "Ranked network measures"
        );

        ranked
            .into_iter()
            .map(|m| Recommendation {
                node: m.node.clone(),
                measure_value: m.measure_value,
                score: normalize(m.measure_value, max, self.config.max_score),
            })
            .collect()
    }
}

fn normalize(value: f64, max: f64, max_score: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    (value / max * max_score).clamp(0.0, max_score)
}

/// Parse a `measure_name,node,measure_value` CSV.
pub fn read_measures<R: Read>(reader: R) -> Result<Vec<NetworkMeasure>> {
    let mut csv = csv::Reader::from_reader(reader);
    let measures = csv
        .deserialize::<NetworkMeasure>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(measures)
}
