// Benchmark-result record types
//
// The record is built once per render call (from a JSON file or the built-in
// sample), consumed synchronously and discarded. Nothing here is persisted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A full leaderboard snapshot plus the metric catalogue it is scored against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// When these numbers were published
    pub timestamp: DateTime<Utc>,
    /// Ranked entries, best first
    pub leaderboard: Vec<ModelEntry>,
    /// Metric key -> descriptor, in presentation order
    pub metrics: IndexMap<String, MetricDescriptor>,
}

impl BenchmarkResult {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            leaderboard: Vec::new(),
            metrics: IndexMap::new(),
        }
    }

    /// Append a leaderboard entry (callers append in rank order)
    pub fn with_entry(mut self, entry: ModelEntry) -> Self {
        self.leaderboard.push(entry);
        self
    }

    /// Append a metric descriptor, keeping insertion order
    pub fn with_metric(mut self, key: impl Into<String>, metric: MetricDescriptor) -> Self {
        self.metrics.insert(key.into(), metric);
        self
    }

    /// The entry at rank 0, if any
    pub fn leader(&self) -> Option<&ModelEntry> {
        self.leaderboard.first()
    }

    /// Metric keys in presentation order
    pub fn metric_keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Parse a record from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One model's row on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Display name of the model
    #[serde(rename = "model")]
    pub name: String,
    /// Aggregate score in [0, 1]
    pub overall_score: f64,
    /// Metric key -> score in [0, 1]
    #[serde(default)]
    pub scores: IndexMap<String, f64>,
    /// 1-based rank as published; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Letter grade as published; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, overall_score: f64) -> Self {
        Self {
            name: name.into(),
            overall_score,
            scores: IndexMap::new(),
            rank: None,
            grade: None,
            strengths: Vec::new(),
        }
    }

    pub fn with_score(mut self, metric: impl Into<String>, score: f64) -> Self {
        self.scores.insert(metric.into(), score);
        self
    }

    /// Score for a metric key, if the entry carries it
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores.get(metric).copied()
    }
}

/// Human-facing description of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Display name (appendix subsection title)
    pub name: String,
    pub description: String,
    pub best_model: String,
    pub best_score: f64,
    /// Column header used in the leaderboard table; falls back to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl MetricDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        best_model: impl Into<String>,
        best_score: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            best_model: best_model.into(),
            best_score,
            short_name: None,
        }
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Header label for table columns
    pub fn column_label(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "timestamp": "2025-01-20T12:00:00Z",
        "leaderboard": [
            {
                "rank": 1,
                "model": "X",
                "overall_score": 0.9,
                "grade": "A",
                "scores": {"a": 0.8, "b": 0.9},
                "strengths": ["fast"]
            }
        ],
        "metrics": {
            "b": {"name": "B", "description": "second", "best_model": "X", "best_score": 0.9},
            "a": {"name": "A", "description": "first", "best_model": "X", "best_score": 0.8, "short_name": "AA"}
        }
    }"#;

    #[test]
    fn test_parse_record_keeps_metric_order() {
        let result = BenchmarkResult::from_json(SAMPLE).unwrap();

        let keys: Vec<&str> = result.metric_keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(result.leader().unwrap().name, "X");
        assert_eq!(result.leaderboard[0].rank, Some(1));
        assert_eq!(result.leaderboard[0].score("a"), Some(0.8));
        assert_eq!(result.leaderboard[0].score("missing"), None);
    }

    #[test]
    fn test_column_label_falls_back_to_name() {
        let result = BenchmarkResult::from_json(SAMPLE).unwrap();

        assert_eq!(result.metrics["a"].column_label(), "AA");
        assert_eq!(result.metrics["b"].column_label(), "B");
    }

    #[test]
    fn test_entry_serializes_name_as_model() {
        let entry = ModelEntry::new("GPT-4o", 0.872).with_score("a", 0.5);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["model"], "GPT-4o");
        assert!(json.get("rank").is_none());
        assert!(json.get("strengths").is_none());
    }

    #[test]
    fn test_builder_appends_in_order() {
        let result = BenchmarkResult::new(Utc::now())
            .with_entry(ModelEntry::new("first", 0.9))
            .with_entry(ModelEntry::new("second", 0.8))
            .with_metric("z", MetricDescriptor::new("Z", "d", "first", 0.5))
            .with_metric("a", MetricDescriptor::new("A", "d", "first", 0.5));

        let names: Vec<&str> = result.leaderboard.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(result.metric_keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
