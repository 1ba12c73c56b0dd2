//! Post-processing transform library
//!
//! Every transform consumes and produces an ordered series of points and may
//! return an empty series to signal "nothing plottable here"; callers omit
//! the group rather than erroring. Transforms compose left to right in the
//! order listed in the plot spec's `post` key.

use crate::series::{distinct_x, SeriesPoint};
use crate::{DbplotError, Result};

/// A named series transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Empty unless the series has at least 2 distinct x values.
    MinSize,
    /// Among points sharing an x, keep only the one with smallest y.
    MinYPerX,
    /// Replace y with |y|.
    Absolute,
    /// Replace y with |y - y_last|: error relative to the converged value.
    AbsDiffFromEnd,
    /// Central 3-point finite-difference derivative, non-uniform spacing.
    Derivative,
    /// Derivative of the difference-from-endpoint curve.
    DerivativeOfAbsDiff,
}

impl Transform {
    /// Parse a transform name from a plot spec.
    pub fn from_name(name: &str) -> Result<Transform> {
        match name {
            "min_size" => Ok(Transform::MinSize),
            "min_y" => Ok(Transform::MinYPerX),
            "absolute" => Ok(Transform::Absolute),
            "abs_diff" => Ok(Transform::AbsDiffFromEnd),
            "derivative" => Ok(Transform::Derivative),
            "derivative_abs_diff" => Ok(Transform::DerivativeOfAbsDiff),
            _ => Err(DbplotError::Config(format!(
                "unknown post-processing transform '{}'; expected one of \
                 min_size, min_y, absolute, abs_diff, derivative, derivative_abs_diff",
                name
            ))),
        }
    }

    pub fn apply(&self, series: Vec<SeriesPoint>) -> Result<Vec<SeriesPoint>> {
        match self {
            Transform::MinSize => Ok(min_size(series)),
            Transform::MinYPerX => Ok(min_y_per_x(series)),
            Transform::Absolute => Ok(absolute(series)),
            Transform::AbsDiffFromEnd => Ok(abs_diff_from_end(series)),
            Transform::Derivative => derivative(series),
            Transform::DerivativeOfAbsDiff => derivative(abs_diff_from_end(series)),
        }
    }
}

fn min_size(series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    if distinct_x(&series) < 2 {
        Vec::new()
    } else {
        series
    }
}

fn min_y_per_x(series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    let mut out: Vec<SeriesPoint> = Vec::new();
    for p in series {
        match out.iter_mut().find(|q| q.x.to_bits() == p.x.to_bits()) {
            Some(existing) => {
                if p.y < existing.y {
                    *existing = p;
                }
            }
            None => out.push(p),
        }
    }
    out
}

fn absolute(series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    series
        .into_iter()
        .map(|mut p| {
            p.y = p.y.abs();
            p
        })
        .collect()
}

fn abs_diff_from_end(series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    if distinct_x(&series) < 2 {
        return Vec::new();
    }
    let y_last = series.last().map(|p| p.y).unwrap_or(0.0);
    series
        .into_iter()
        .map(|mut p| {
            p.y = (p.y - y_last).abs();
            p
        })
        .collect()
}

fn derivative(series: Vec<SeriesPoint>) -> Result<Vec<SeriesPoint>> {
    if distinct_x(&series) < 3 {
        return Ok(Vec::new());
    }
    let xs: Vec<f64> = series.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = series.iter().map(|p| p.y).collect();
    let dydx = derivative_xy(&xs, &ys)?;

    // endpoints have no derivative estimate and are dropped
    Ok(series
        .into_iter()
        .skip(1)
        .zip(dydx)
        .map(|(mut p, (_, d))| {
            p.y = d;
            p
        })
        .collect())
}

/// Central three-point finite-difference derivative for non-uniformly spaced
/// samples. Input length N yields N-2 (x, dy/dx) pairs, endpoints dropped.
///
/// With `h1 = x[i] - x[i-1]` and `h2 = x[i+1] - x[i]`:
///
/// ```text
/// dydx[i] = h1/(h2*(h1+h2)) * y[i+1]
///         - (h1-h2)/(h1*h2) * y[i]
///         - h2/(h1*(h1+h2)) * y[i-1]
/// ```
///
/// The formula is undefined when two samples share an x, which is a
/// [`DbplotError::DuplicateAbscissa`] rather than a silent mis-computation.
pub fn derivative_xy(xs: &[f64], ys: &[f64]) -> Result<Vec<(f64, f64)>> {
    debug_assert_eq!(xs.len(), ys.len());

    let mut seen: Vec<u64> = Vec::with_capacity(xs.len());
    for x in xs {
        let bits = x.to_bits();
        if seen.contains(&bits) {
            return Err(DbplotError::DuplicateAbscissa(format!(
                "multiple y values at x = {}; aggregate or filter before differentiating",
                x
            )));
        }
        seen.push(bits);
    }

    let mut out = Vec::with_capacity(xs.len().saturating_sub(2));
    for i in 1..xs.len().saturating_sub(1) {
        let h1 = xs[i] - xs[i - 1];
        let h2 = xs[i + 1] - xs[i];
        let (f0, f1, f2) = (ys[i - 1], ys[i], ys[i + 1]);
        let d = h1 / (h2 * (h1 + h2)) * f2 - (h1 - h2) / (h1 * h2) * f1
            - h2 / (h1 * (h1 + h2)) * f0;
        out.push((xs[i], d));
    }
    Ok(out)
}
