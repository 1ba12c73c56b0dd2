//! Renderer-agnostic figure description
//!
//! The engine's output boundary. A [`Figure`] carries styled series marks,
//! axis titles, tick labels, and legend entries; writers are responsible for
//! pixel-level drawing and never feed anything back into the engine.

use serde::Serialize;

use crate::series::SeriesPoint;
use crate::style::Style;

/// A complete plot, ready for a writer.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesDesc>,
    /// Explicit x-axis tick labels (bar plots); empty means numeric ticks.
    pub x_ticks: Vec<Tick>,
    /// Legend entries, first-seen order, duplicates and empties removed.
    pub legend: Vec<LegendEntry>,
}

impl Figure {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Figure {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            x_ticks: Vec::new(),
            legend: Vec::new(),
        }
    }

    /// Rebuild the legend from the current series labels.
    pub fn build_legend(&mut self) {
        self.legend.clear();
        for s in &self.series {
            if s.label.is_empty() || self.legend.iter().any(|e| e.label == s.label) {
                continue;
            }
            self.legend.push(LegendEntry {
                label: s.label.clone(),
                style: s.style,
            });
        }
    }
}

/// One styled series within a figure.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesDesc {
    pub label: String,
    pub style: Style,
    pub mark: Mark,
}

/// Geometry of a series.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mark {
    /// Connected (or scattered) points with per-point labels.
    Line {
        points: Vec<SeriesPoint>,
        scatter: bool,
    },
    /// Axis-aligned bars (bar plots and histograms).
    Bars { bars: Vec<Bar> },
}

/// One bar: left edge, width, height, and how many rows it aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub multiplicity: usize,
}

/// A labeled x-axis tick position.
#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// One legend entry.
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub style: Style,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_dedupes_first_seen() {
        let mut fig = Figure::new("t", "x", "y");
        for label in ["a", "b", "a", ""] {
            fig.series.push(SeriesDesc {
                label: label.to_string(),
                style: crate::style::resolve(label),
                mark: Mark::Bars { bars: vec![] },
            });
        }
        fig.build_legend();
        let labels: Vec<&str> = fig.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
