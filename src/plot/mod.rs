//! Plot strategy layer
//!
//! Three plot kinds (Line, Bar, Histogram) share one orchestration skeleton:
//! query → extract → group → aggregate → post-process → figure assembly.
//! Each kind supplies only its own extraction and drawing rule. All extractor
//! binding and validation happens in [`Plot::new`], before any query runs;
//! per-row extraction failures after that are silent drops.

mod config;
mod figure;

pub use config::{Columns, ConvergenceOverride, PlotConfig, PlotKind};
pub use figure::{Bar, Figure, LegendEntry, Mark, SeriesDesc, Tick};

use crate::aggregate::{Aggregation, ConvergenceSpec, ThresholdTable};
use crate::extract::{ColumnDefault, Extractor, FunctionRegistry};
use crate::group::{partition, partition_rows, Group, GroupKey};
use crate::reader::Reader;
use crate::series::{assemble, SeriesPoint};
use crate::style;
use crate::transform::Transform;
use crate::{DbplotError, Result, Row, Value};

/// How a (sub)group collapses into bar heights.
#[derive(Debug, Clone)]
enum BarAggregation {
    Scalar(Aggregation),
    Converged(ConvergenceSpec),
}

/// A validated, fully bound plot. Construction is the `Configured` state;
/// [`Plot::render`] walks the remaining states in one forward pass.
#[derive(Debug)]
pub struct Plot {
    config: PlotConfig,
    x: Extractor,
    y: Option<Extractor>,
    label: Option<Extractor>,
    group: Option<Extractor>,
    group_label: Option<Extractor>,
    sub_group: Option<Extractor>,
    sub_group_label: Option<Extractor>,
    /// Same-x aggregation for line series (only when explicitly configured).
    line_aggregation: Option<Aggregation>,
    bar_aggregation: BarAggregation,
    transforms: Vec<Transform>,
    bins: usize,
    normalize: bool,
    scatter: bool,
}

impl Plot {
    /// Bind and validate a plot spec against a function registry, using the
    /// built-in convergence threshold table.
    pub fn new(config: PlotConfig, registry: &FunctionRegistry) -> Result<Plot> {
        Plot::with_thresholds(config, registry, &ThresholdTable::builtin())
    }

    /// As [`Plot::new`] with caller-supplied convergence thresholds.
    pub fn with_thresholds(
        config: PlotConfig,
        registry: &FunctionRegistry,
        thresholds: &ThresholdTable,
    ) -> Result<Plot> {
        if config.query.trim().is_empty() {
            return Err(DbplotError::Config("empty query".to_string()));
        }

        let x = bind(
            &config.x_function,
            &config.x_columns,
            registry,
            ColumnDefault::Identity,
        )?
        .ok_or_else(|| {
            DbplotError::Config("an x extractor (x_columns or x_function) is required".to_string())
        })?;

        let y = bind(
            &config.y_function,
            &config.y_columns,
            registry,
            ColumnDefault::Identity,
        )?;
        if config.kind == PlotKind::Line && y.is_none() {
            return Err(DbplotError::Config(
                "line plots require a y extractor (y_columns or y_function)".to_string(),
            ));
        }

        let label = bind(
            &config.label_function,
            &config.label_columns,
            registry,
            ColumnDefault::JoinUnderscore,
        )?;
        let group = bind(
            &config.group_function,
            &config.group_columns,
            registry,
            ColumnDefault::JoinUnderscore,
        )?;
        // the group label falls back to the group key itself
        let group_label = bind(
            &config
                .group_label_function
                .clone()
                .or_else(|| config.group_function.clone()),
            &config
                .group_label_columns
                .clone()
                .or_else(|| config.group_columns.clone()),
            registry,
            ColumnDefault::JoinUnderscore,
        )?;
        let sub_group = bind(
            &config.sub_group_function,
            &config.sub_group_columns,
            registry,
            ColumnDefault::JoinUnderscore,
        )?;
        let sub_group_label = bind(
            &config
                .sub_group_label_function
                .clone()
                .or_else(|| config.sub_group_function.clone()),
            &config
                .sub_group_label_columns
                .clone()
                .or_else(|| config.sub_group_columns.clone()),
            registry,
            ColumnDefault::JoinUnderscore,
        )?;

        let (line_aggregation, bar_aggregation) = match config.aggregation_function.as_deref() {
            Some("converged") => {
                if y.is_none() {
                    return Err(DbplotError::Config(
                        "the converged aggregation needs a y extractor for its observations"
                            .to_string(),
                    ));
                }
                let spec = resolve_convergence(&config, thresholds)?;
                (None, BarAggregation::Converged(spec))
            }
            Some(name) => {
                let agg = Aggregation::from_name(name)?;
                (Some(agg), BarAggregation::Scalar(agg))
            }
            None => (None, BarAggregation::Scalar(Aggregation::Mean)),
        };

        let transforms = config
            .post
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|name| Transform::from_name(name))
            .collect::<Result<Vec<Transform>>>()?;

        let bins = config.bins.unwrap_or(10);
        if bins == 0 {
            return Err(DbplotError::Config("bins must be positive".to_string()));
        }

        Ok(Plot {
            x,
            y,
            label,
            group,
            group_label,
            sub_group,
            sub_group_label,
            line_aggregation,
            bar_aggregation,
            transforms,
            bins,
            normalize: config.normalize.unwrap_or(false),
            scatter: config.scatter.unwrap_or(false),
            config,
        })
    }

    pub fn kind(&self) -> PlotKind {
        self.config.kind
    }

    /// Run the whole pipeline for one render: execute the query through the
    /// reader, partition the rows, and assemble the figure for this kind.
    pub fn render(&self, reader: &dyn Reader, binds: &[Value]) -> Result<Figure> {
        let rows = reader.execute_sql(&self.config.query, binds)?;

        let groups = partition_rows(rows, self.group.as_ref(), self.group_label.as_ref());

        let mut figure = Figure::new(
            self.config.title.as_deref().unwrap_or(""),
            self.config.x_label.as_deref().unwrap_or(""),
            self.config.y_label.as_deref().unwrap_or(""),
        );
        match self.config.kind {
            PlotKind::Line => self.draw_lines(&groups, &mut figure)?,
            PlotKind::Bar => self.draw_bars(&groups, &mut figure)?,
            PlotKind::Histogram => self.draw_histograms(&groups, &mut figure)?,
        }
        figure.build_legend();
        Ok(figure)
    }

    fn point_label(&self, row: &Row) -> String {
        match &self.label {
            Some(f) => f.apply(row).to_string(),
            None => String::new(),
        }
    }

    fn draw_lines(&self, groups: &[Group<Row>], figure: &mut Figure) -> Result<()> {
        let y = self.y.as_ref().expect("validated at configuration");
        for group in groups {
            let raw: Vec<SeriesPoint> = group
                .elements
                .iter()
                .filter_map(|row| {
                    let px = self.x.apply(row).as_f64()?;
                    let py = y.apply(row).as_f64()?;
                    Some(SeriesPoint {
                        x: px,
                        y: py,
                        label: self.point_label(row),
                        multiplicity: 1,
                    })
                })
                .collect();

            let points = assemble(raw, self.line_aggregation.as_ref(), &self.transforms)?;
            if points.is_empty() {
                continue;
            }
            figure.series.push(SeriesDesc {
                label: group.label.clone(),
                style: style::resolve(&group.label),
                mark: Mark::Line {
                    points,
                    scatter: self.scatter,
                },
            });
        }
        Ok(())
    }

    fn draw_bars(&self, groups: &[Group<Row>], figure: &mut Figure) -> Result<()> {
        for group in groups {
            let elements: Vec<BarElement> = group
                .elements
                .iter()
                .filter_map(|row| {
                    let x = self.x.apply(row).as_f64()?;
                    Some(BarElement {
                        x,
                        y: self.y.as_ref().and_then(|f| f.apply(row).as_f64()),
                        sub_key: self.sub_group.as_ref().map(|f| GroupKey(f.apply(row))),
                        sub_label: match &self.sub_group_label {
                            Some(f) => f.apply(row).to_string(),
                            None => String::new(),
                        },
                    })
                })
                .collect();
            if elements.is_empty() {
                continue;
            }

            figure.x_ticks.push(Tick {
                position: group.id as f64 + 0.5,
                label: group.label.clone(),
            });

            if self.sub_group.is_none() {
                let height = self.bar_height(&elements)?;
                figure.series.push(SeriesDesc {
                    label: group.label.clone(),
                    style: style::resolve(&group.label),
                    mark: Mark::Bars {
                        bars: vec![Bar {
                            x: group.id as f64,
                            width: 1.0,
                            height,
                            multiplicity: elements.len(),
                        }],
                    },
                });
            } else {
                let sub_groups = partition(
                    elements,
                    |e| e.sub_key.clone().unwrap_or(GroupKey(Value::Null)),
                    |e| e.sub_label.clone(),
                );
                let n = sub_groups.len() as f64;
                for sub in &sub_groups {
                    let height = self.bar_height(&sub.elements)?;
                    figure.series.push(SeriesDesc {
                        label: sub.label.clone(),
                        style: style::resolve(&sub.label),
                        mark: Mark::Bars {
                            bars: vec![Bar {
                                x: group.id as f64 + sub.id as f64 / n,
                                width: 1.0 / n,
                                height,
                                multiplicity: sub.len(),
                            }],
                        },
                    });
                }
            }
        }
        Ok(())
    }

    fn bar_height(&self, elements: &[BarElement]) -> Result<f64> {
        match &self.bar_aggregation {
            BarAggregation::Scalar(agg) => {
                let xs: Vec<f64> = elements.iter().map(|e| e.x).collect();
                Ok(agg.apply(&xs))
            }
            BarAggregation::Converged(spec) => {
                let xys: Vec<(f64, f64)> = elements
                    .iter()
                    .filter_map(|e| e.y.map(|y| (e.x, y)))
                    .collect();
                spec.detect(&xys)
            }
        }
    }

    fn draw_histograms(&self, groups: &[Group<Row>], figure: &mut Figure) -> Result<()> {
        for group in groups {
            let values: Vec<f64> = group
                .elements
                .iter()
                .filter_map(|row| self.x.apply(row).as_f64())
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                continue;
            }

            let bars = bin_values(&values, self.bins, self.normalize);
            figure.series.push(SeriesDesc {
                label: group.label.clone(),
                style: style::resolve(&group.label),
                mark: Mark::Bars { bars },
            });
        }
        Ok(())
    }
}

struct BarElement {
    x: f64,
    y: Option<f64>,
    sub_key: Option<GroupKey>,
    sub_label: String,
}

/// Bin values into `bins` equal intervals over their range; a degenerate
/// range widens to a unit interval around the single value.
fn bin_values(values: &[f64], bins: usize, normalize: bool) -> Vec<Bar> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| Bar {
            x: lo + i as f64 * width,
            width,
            height: if normalize {
                count as f64 / total
            } else {
                count as f64
            },
            multiplicity: count,
        })
        .collect()
}

fn bind(
    func_name: &Option<String>,
    columns: &Option<Columns>,
    registry: &FunctionRegistry,
    default: ColumnDefault,
) -> Result<Option<Extractor>> {
    let cols = columns.as_ref().map(Columns::to_vec);
    Extractor::bind(func_name.as_deref(), cols.as_deref(), registry, default)
}

fn resolve_convergence(config: &PlotConfig, thresholds: &ThresholdTable) -> Result<ConvergenceSpec> {
    let lookup = || -> Option<ConvergenceSpec> {
        let x_col = config.x_columns.as_ref()?.to_vec().into_iter().next()?;
        let y_col = config.y_columns.as_ref()?.to_vec().into_iter().next()?;
        thresholds.lookup(&x_col, &y_col)
    };
    let base = lookup();
    let over = config.convergence.as_ref();

    let mut spec = match (base, over) {
        (Some(spec), _) => spec,
        (None, Some(o)) if o.max_slope.is_some() && o.trailing_range.is_some() => {
            ConvergenceSpec::new(o.max_slope.unwrap(), o.trailing_range.unwrap())
        }
        _ => {
            return Err(DbplotError::Config(
                "no convergence thresholds known for this (x, y) column pair; \
                 supply max_slope and trailing_range under the 'convergence' key"
                    .to_string(),
            ))
        }
    };
    if let Some(o) = over {
        if let Some(m) = o.max_slope {
            spec.max_slope = m;
        }
        if let Some(r) = o.trailing_range {
            spec.trailing_range = r;
        }
        if let Some(a) = o.average {
            spec.average = a;
        }
    }
    Ok(spec)
}
