// Record validation
//
// Rendering references every metric key against every leaderboard entry, and
// treats leaderboard[0] as the leader. Both preconditions are checked here once,
// so renderers never see a record that would need a blank or zero fallback.

use thiserror::Error;

use crate::benchmark::{BenchmarkResult, MetricDescriptor, ModelEntry};

/// Reasons a record cannot be rendered
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No leaderboard entries, so there is no leader to report
    #[error("leaderboard is empty: missing leaderboard entry 0")]
    EmptyLeaderboard,

    /// No metrics to tabulate or describe
    #[error("record defines no metrics")]
    NoMetrics,

    /// A required text field is empty
    #[error("required field '{field}' is blank")]
    BlankField { field: String },

    /// An entry lacks a score for a metric the record defines
    #[error("model '{model}' has no score for metric '{metric}'")]
    MissingScore { model: String, metric: String },

    /// A score is NaN, infinite or outside [0, 1]
    #[error("score {value} for model '{model}' on '{metric}' is outside [0, 1]")]
    ScoreOutOfRange {
        model: String,
        metric: String,
        value: f64,
    },

    /// The leaderboard is not sorted best-first by overall score
    #[error("leaderboard entry {position} ('{model}') scores higher than the entry ranked above it")]
    NotRanked { position: usize, model: String },
}

impl ValidationError {
    fn blank(field: impl Into<String>) -> Self {
        ValidationError::BlankField {
            field: field.into(),
        }
    }

    fn out_of_range(model: &str, metric: &str, value: f64) -> Self {
        ValidationError::ScoreOutOfRange {
            model: model.to_string(),
            metric: metric.to_string(),
            value,
        }
    }
}

/// Proof that a record passed validation
///
/// Only obtainable through [`BenchmarkResult::validate`]; holds a borrow of the
/// record, so the record cannot change underneath it.
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    result: &'a BenchmarkResult,
}

/// Maximum number of per-metric columns in the leaderboard table
pub const MAX_TABLE_COLUMNS: usize = 3;

impl<'a> Validated<'a> {
    pub fn result(&self) -> &'a BenchmarkResult {
        self.result
    }

    /// Rank-0 entry; always present after validation
    pub fn leader(&self) -> &'a ModelEntry {
        &self.result.leaderboard[0]
    }

    pub fn entries(&self) -> &'a [ModelEntry] {
        &self.result.leaderboard
    }

    /// Metrics in presentation order
    pub fn metrics(&self) -> impl Iterator<Item = (&'a str, &'a MetricDescriptor)> {
        self.result.metrics.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// The first metric in presentation order; always present after validation
    pub fn first_metric(&self) -> (&'a str, &'a MetricDescriptor) {
        let (key, metric) = self
            .result
            .metrics
            .get_index(0)
            .expect("validated record has at least one metric");
        (key.as_str(), metric)
    }

    /// Metric keys shown as table columns (at most three, in metric order)
    pub fn table_columns(&self) -> Vec<&'a str> {
        self.result
            .metrics
            .keys()
            .take(MAX_TABLE_COLUMNS)
            .map(String::as_str)
            .collect()
    }

    /// Score lookup; every (entry, metric key) pair is guaranteed present
    pub fn score(&self, entry: &ModelEntry, metric: &str) -> f64 {
        entry
            .score(metric)
            .expect("validated record has every metric score")
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl BenchmarkResult {
    /// Check every rendering precondition and return a witness on success
    pub fn validate(&self) -> Result<Validated<'_>, ValidationError> {
        if self.leaderboard.is_empty() {
            return Err(ValidationError::EmptyLeaderboard);
        }
        if self.metrics.is_empty() {
            return Err(ValidationError::NoMetrics);
        }

        for (idx, entry) in self.leaderboard.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ValidationError::blank(format!("leaderboard[{}].model", idx)));
            }
        }
        for (key, metric) in &self.metrics {
            if metric.name.trim().is_empty() {
                return Err(ValidationError::blank(format!("metrics.{}.name", key)));
            }
        }

        for entry in &self.leaderboard {
            for key in self.metrics.keys() {
                if !entry.scores.contains_key(key) {
                    return Err(ValidationError::MissingScore {
                        model: entry.name.clone(),
                        metric: key.clone(),
                    });
                }
            }
        }

        for entry in &self.leaderboard {
            if !in_unit_range(entry.overall_score) {
                return Err(ValidationError::out_of_range(
                    &entry.name,
                    "overall_score",
                    entry.overall_score,
                ));
            }
            for key in self.metrics.keys() {
                let value = entry.scores[key];
                if !in_unit_range(value) {
                    return Err(ValidationError::out_of_range(&entry.name, key, value));
                }
            }
        }

        for (key, metric) in &self.metrics {
            if !in_unit_range(metric.best_score) {
                return Err(ValidationError::out_of_range(
                    &metric.best_model,
                    key,
                    metric.best_score,
                ));
            }
        }

        for (position, pair) in self.leaderboard.windows(2).enumerate() {
            if pair[1].overall_score > pair[0].overall_score {
                return Err(ValidationError::NotRanked {
                    position: position + 1,
                    model: pair[1].name.clone(),
                });
            }
        }

        Ok(Validated { result: self })
    }
}
