//! Series assembly
//!
//! Turns a group's extracted (x, y, label) tuples into an ordered series:
//! unplottable points are dropped, same-x values are optionally collapsed
//! with an aggregation function, points are stably sorted by x, and the
//! configured transform pipeline runs over the result. An empty result means
//! "omit this group", never an error.

use serde::Serialize;

use crate::aggregate::Aggregation;
use crate::transform::Transform;
use crate::Result;

/// One renderable point. `multiplicity` records how many raw rows were
/// aggregated into it, for weighting and count display downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub multiplicity: usize,
}

impl SeriesPoint {
    pub fn new(x: f64, y: f64, label: impl Into<String>) -> Self {
        SeriesPoint {
            x,
            y,
            label: label.into(),
            multiplicity: 1,
        }
    }
}

/// Number of distinct x values in a series.
pub fn distinct_x(series: &[SeriesPoint]) -> usize {
    let mut seen: Vec<u64> = Vec::with_capacity(series.len());
    for p in series {
        let bits = p.x.to_bits();
        if !seen.contains(&bits) {
            seen.push(bits);
        }
    }
    seen.len()
}

/// Collapse points sharing an x value with an aggregation over their ys.
///
/// The collapsed point keeps the label of the first point seen at that x and
/// sums the multiplicities. First-seen x order is preserved (the subsequent
/// sort decides final order).
pub fn aggregate_same_x(series: Vec<SeriesPoint>, agg: &Aggregation) -> Vec<SeriesPoint> {
    let mut buckets: Vec<(u64, SeriesPoint, Vec<f64>)> = Vec::new();
    for p in series {
        let bits = p.x.to_bits();
        match buckets.iter_mut().find(|(b, _, _)| *b == bits) {
            Some((_, first, ys)) => {
                first.multiplicity += p.multiplicity;
                ys.push(p.y);
            }
            None => {
                let y = p.y;
                buckets.push((bits, p, vec![y]));
            }
        }
    }
    buckets
        .into_iter()
        .map(|(_, mut point, ys)| {
            point.y = agg.apply(&ys);
            point
        })
        .collect()
}

/// Stable sort by x ascending; ties keep insertion order for determinism.
pub fn sort_by_x(series: &mut [SeriesPoint]) {
    series.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
}

/// Run the full assembly: drop non-finite points, optionally collapse same-x
/// values, sort, then apply the transform pipeline left to right.
pub fn assemble(
    raw: Vec<SeriesPoint>,
    aggregation: Option<&Aggregation>,
    transforms: &[Transform],
) -> Result<Vec<SeriesPoint>> {
    let mut series: Vec<SeriesPoint> = raw
        .into_iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();

    if let Some(agg) = aggregation {
        series = aggregate_same_x(series, agg);
    }
    sort_by_x(&mut series);

    for transform in transforms {
        series = transform.apply(series)?;
        if series.is_empty() {
            break;
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> SeriesPoint {
        SeriesPoint::new(x, y, "")
    }

    #[test]
    fn test_aggregate_same_x_mean_and_multiplicity() {
        let series = vec![pt(1.0, 2.0), pt(1.0, 4.0), pt(2.0, 10.0)];
        let out = aggregate_same_x(series, &Aggregation::Mean);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].y, 3.0);
        assert_eq!(out[0].multiplicity, 2);
        assert_eq!(out[1].y, 10.0);
        assert_eq!(out[1].multiplicity, 1);
    }

    #[test]
    fn test_singleton_mean_is_identity() {
        let out = aggregate_same_x(vec![pt(3.0, 7.5)], &Aggregation::Mean);
        assert_eq!(out, vec![pt(3.0, 7.5)]);
    }

    #[test]
    fn test_aggregate_keeps_first_label() {
        let series = vec![
            SeriesPoint::new(1.0, 2.0, "first"),
            SeriesPoint::new(1.0, 4.0, "second"),
        ];
        let out = aggregate_same_x(series, &Aggregation::Mean);
        assert_eq!(out[0].label, "first");
    }

    #[test]
    fn test_sort_is_stable_under_ties() {
        let mut series = vec![
            SeriesPoint::new(2.0, 1.0, "a"),
            SeriesPoint::new(1.0, 0.0, "b"),
            SeriesPoint::new(2.0, 2.0, "c"),
        ];
        sort_by_x(&mut series);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_assemble_drops_non_finite() {
        let series = vec![pt(1.0, f64::NAN), pt(f64::INFINITY, 1.0), pt(2.0, 3.0)];
        let out = assemble(series, None, &[]).unwrap();
        assert_eq!(out, vec![pt(2.0, 3.0)]);
    }

    #[test]
    fn test_assemble_empty_pipeline_result_is_ok() {
        // a single point cannot support a line; MinSize empties the series
        let out = assemble(vec![pt(1.0, 1.0)], None, &[Transform::MinSize]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_distinct_x() {
        assert_eq!(distinct_x(&[pt(1.0, 0.0), pt(1.0, 1.0), pt(2.0, 0.0)]), 2);
        assert_eq!(distinct_x(&[]), 0);
    }
}
