//! Aggregation functions and the convergence detector
//!
//! Scalar aggregations collapse a list of values into one number (bar
//! heights, same-x collapsing). The convergence detector is the aggregation
//! counterpart for convergence studies: it collapses a whole group's (x, y)
//! observations into the smallest x beyond which the derivative stays inside
//! a tolerance band over a trailing x-range.

use crate::transform::derivative_xy;
use crate::{DbplotError, Result};

/// A scalar aggregation over a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Arithmetic mean (the default).
    Mean,
    /// Mean of absolute values.
    AbsMean,
    /// Root mean square.
    Rms,
    /// Geometric mean of nonzero absolute values.
    GMeanAbs,
    Min,
    Max,
    Sum,
    Count,
}

impl Aggregation {
    pub fn from_name(name: &str) -> Result<Aggregation> {
        match name {
            "mean" => Ok(Aggregation::Mean),
            "abs_mean" => Ok(Aggregation::AbsMean),
            "rms" => Ok(Aggregation::Rms),
            "gmean_abs" => Ok(Aggregation::GMeanAbs),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            _ => Err(DbplotError::Config(format!(
                "unknown aggregation function '{}'; expected one of \
                 mean, abs_mean, rms, gmean_abs, min, max, sum, count, converged",
                name
            ))),
        }
    }

    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let n = values.len() as f64;
        match self {
            Aggregation::Mean => values.iter().sum::<f64>() / n,
            Aggregation::AbsMean => values.iter().map(|v| v.abs()).sum::<f64>() / n,
            Aggregation::Rms => (values.iter().map(|v| v * v).sum::<f64>() / n).sqrt(),
            Aggregation::GMeanAbs => {
                let logs: Vec<f64> = values
                    .iter()
                    .filter(|v| **v != 0.0)
                    .map(|v| v.abs().ln())
                    .collect();
                if logs.is_empty() {
                    0.0
                } else {
                    (logs.iter().sum::<f64>() / logs.len() as f64).exp()
                }
            }
            Aggregation::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Count => n,
        }
    }
}

/// Thresholds for one convergence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceSpec {
    /// Upper bound on |dy/dx|; tiny positive slopes up to `max_slope / 10`
    /// are tolerated so a basically flat line still qualifies.
    pub max_slope: f64,
    /// Distance in x the derivative must stay inside the band, measured back
    /// from the second-to-last sample.
    pub trailing_range: f64,
    /// Average y values sharing an x before differentiating.
    pub average: bool,
}

impl ConvergenceSpec {
    pub fn new(max_slope: f64, trailing_range: f64) -> Self {
        ConvergenceSpec {
            max_slope,
            trailing_range,
            average: true,
        }
    }

    /// The smallest x beyond which the derivative of the series stays within
    /// `[-max_slope, max_slope/10]` through the end of the data, provided the
    /// window from that x to the second-to-last x covers `trailing_range`.
    ///
    /// Returns the sentinel `0` when fewer than 5 distinct x values exist or
    /// no qualifying window is found.
    pub fn detect(&self, observations: &[(f64, f64)]) -> Result<f64> {
        let mut xy: Vec<(f64, f64)> = if self.average {
            let mut buckets: Vec<(f64, Vec<f64>)> = Vec::new();
            for &(x, y) in observations {
                match buckets.iter_mut().find(|(bx, _)| bx.to_bits() == x.to_bits()) {
                    Some((_, ys)) => ys.push(y),
                    None => buckets.push((x, vec![y])),
                }
            }
            buckets
                .into_iter()
                .map(|(x, ys)| (x, ys.iter().sum::<f64>() / ys.len() as f64))
                .collect()
        } else {
            observations.to_vec()
        };
        xy.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut distinct = 0;
        let mut last_bits = None;
        for &(x, _) in &xy {
            if last_bits != Some(x.to_bits()) {
                distinct += 1;
                last_bits = Some(x.to_bits());
            }
        }
        if distinct < 5 {
            return Ok(0.0);
        }

        let xs: Vec<f64> = xy.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = xy.iter().map(|p| p.1).collect();
        let x_max = xs[xs.len() - 2];
        let dydx = derivative_xy(&xs, &ys)?;

        let in_band =
            |d: f64| -self.max_slope <= d && d <= self.max_slope / 10.0;

        // first derivative sample where the whole remaining tail stays in band
        let mut start = dydx.len();
        for (i, &(_, d)) in dydx.iter().enumerate().rev() {
            if in_band(d) {
                start = i;
            } else {
                break;
            }
        }
        match dydx.get(start) {
            Some(&(x, _)) if x_max - x >= self.trailing_range => Ok(x),
            _ => Ok(0.0),
        }
    }
}

/// Convergence thresholds keyed by the (x-column, y-column) pair being
/// plotted. Ships with the known domain table; callers may insert their own
/// entries or override per plot via the `convergence` spec key.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    entries: Vec<(String, String, f64, f64)>,
}

impl ThresholdTable {
    pub fn empty() -> Self {
        ThresholdTable {
            entries: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = ThresholdTable::empty();
        table.insert("pw", "raw_energy", 0.001, 200.0);
        table.insert("pw", "error_BM", 100.0, 200.0);
        table.insert("pw", "error_lattice_A", 0.001, 300.0);
        table
    }

    pub fn insert(&mut self, x_column: &str, y_column: &str, max_slope: f64, trailing_range: f64) {
        self.entries.push((
            x_column.to_string(),
            y_column.to_string(),
            max_slope,
            trailing_range,
        ));
    }

    pub fn lookup(&self, x_column: &str, y_column: &str) -> Option<ConvergenceSpec> {
        self.entries
            .iter()
            .find(|(x, y, _, _)| x == x_column && y == y_column)
            .map(|&(_, _, max_slope, trailing_range)| ConvergenceSpec::new(max_slope, trailing_range))
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        ThresholdTable::builtin()
    }
}
