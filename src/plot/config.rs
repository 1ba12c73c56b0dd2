//! Plot specification records
//!
//! A plot spec is a JSON document deserialized into [`PlotConfig`]. The
//! record enumerates every recognized option; unknown keys are rejected at
//! load time, and all remaining validation happens in `Plot::new` before any
//! query executes.

use std::path::Path;

use serde::Deserialize;

use crate::{DbplotError, Result};

/// The closed set of plot kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Line,
    Bar,
    #[serde(rename = "hist", alias = "histogram")]
    Histogram,
}

/// Column list: either a whitespace-separated string (`"a b c"`) or a JSON
/// array of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Columns {
    Spaced(String),
    List(Vec<String>),
}

impl Columns {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Columns::Spaced(s) => s.split_whitespace().map(str::to_string).collect(),
            Columns::List(v) => v.clone(),
        }
    }
}

/// Per-plot override of convergence detection thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvergenceOverride {
    pub max_slope: Option<f64>,
    pub trailing_range: Option<f64>,
    pub average: Option<bool>,
}

/// One plot specification.
///
/// Defaults: label and group-label functions join their columns with `_`;
/// `group_label_*` falls back to `group_*`; no `group_columns` means a single
/// group with an empty label; `bins` defaults to 10.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotConfig {
    #[serde(rename = "type")]
    pub kind: PlotKind,
    pub query: String,

    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,

    pub x_columns: Option<Columns>,
    pub x_function: Option<String>,
    pub y_columns: Option<Columns>,
    pub y_function: Option<String>,
    pub label_columns: Option<Columns>,
    pub label_function: Option<String>,
    pub group_columns: Option<Columns>,
    pub group_function: Option<String>,
    pub group_label_columns: Option<Columns>,
    pub group_label_function: Option<String>,
    pub sub_group_columns: Option<Columns>,
    pub sub_group_function: Option<String>,
    pub sub_group_label_columns: Option<Columns>,
    pub sub_group_label_function: Option<String>,

    pub aggregation_function: Option<String>,
    /// Ordered post-processing pipeline, applied left to right.
    pub post: Option<Vec<String>>,
    pub convergence: Option<ConvergenceOverride>,

    pub bins: Option<usize>,
    pub normalize: Option<bool>,
    pub scatter: Option<bool>,
}

impl PlotConfig {
    /// Load a plot spec from a JSON file.
    pub fn from_path(path: &Path) -> Result<PlotConfig> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DbplotError::Config(format!("cannot read plot spec {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DbplotError::Config(format!("invalid plot spec {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_spaced_and_list() {
        let spaced: Columns = serde_json::from_str(r#""a b  c""#).unwrap();
        assert_eq!(spaced.to_vec(), vec!["a", "b", "c"]);
        let list: Columns = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(list.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_kind_aliases() {
        let k: PlotKind = serde_json::from_str(r#""hist""#).unwrap();
        assert_eq!(k, PlotKind::Histogram);
        let k: PlotKind = serde_json::from_str(r#""histogram""#).unwrap();
        assert_eq!(k, PlotKind::Histogram);
    }

    #[test]
    fn test_minimal_config_parses() {
        let config: PlotConfig =
            serde_json::from_str(r#"{"type": "bar", "query": "SELECT 1", "x_columns": "a"}"#)
                .unwrap();
        assert_eq!(config.kind, PlotKind::Bar);
        assert!(config.bins.is_none());
    }

    #[test]
    fn test_missing_type_is_error() {
        let result: std::result::Result<PlotConfig, _> =
            serde_json::from_str(r#"{"query": "SELECT 1"}"#);
        assert!(result.is_err());
    }
}
