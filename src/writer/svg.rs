//! SVG writer backed by plotters
//!
//! Draws the figure description with the plotters SVG backend: lines with
//! dash patterns and markers, bars as filled rectangles, a legend from the
//! figure's entries.

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::plot::{Figure, Mark};
use crate::style::{LinePattern, Marker, Style};
use crate::{DbplotError, Result};

pub struct SvgWriter {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgWriter {
    fn default() -> Self {
        SvgWriter {
            width: 800,
            height: 600,
        }
    }
}

fn color_of(style: &Style) -> RGBColor {
    let (r, g, b) = style.rgb();
    RGBColor(r, g, b)
}

/// Data ranges covered by a figure, padded so flat series stay visible.
fn data_ranges(figure: &Figure) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    let mut cover = |range: &mut (f64, f64), v: f64| {
        range.0 = range.0.min(v);
        range.1 = range.1.max(v);
    };
    for s in &figure.series {
        match &s.mark {
            Mark::Line { points, .. } => {
                for p in points {
                    cover(&mut x, p.x);
                    cover(&mut y, p.y);
                }
            }
            Mark::Bars { bars } => {
                for b in bars {
                    cover(&mut x, b.x);
                    cover(&mut x, b.x + b.width);
                    cover(&mut y, 0.0);
                    cover(&mut y, b.height);
                }
            }
        }
    }
    if x.0 > x.1 {
        x = (0.0, 1.0);
    }
    if y.0 > y.1 {
        y = (0.0, 1.0);
    }
    let pad = |(lo, hi): (f64, f64)| {
        let span = if hi > lo { hi - lo } else { 1.0 };
        (lo - 0.05 * span)..(hi + 0.05 * span)
    };
    (pad(x), pad(y))
}

impl super::Writer for SvgWriter {
    fn write(&self, figure: &Figure) -> Result<String> {
        let mut out = String::new();
        {
            let root = SVGBackend::with_string(&mut out, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| DbplotError::Writer(e.to_string()))?;

            let (x_range, y_range) = data_ranges(figure);
            let mut chart = ChartBuilder::on(&root)
                .caption(&figure.title, ("sans-serif", 22))
                .margin(12)
                .x_label_area_size(42)
                .y_label_area_size(56)
                .build_cartesian_2d(x_range, y_range)
                .map_err(|e| DbplotError::Writer(e.to_string()))?;

            let tick_formatter = |x: &f64| {
                figure
                    .x_ticks
                    .iter()
                    .min_by(|a, b| {
                        (a.position - x)
                            .abs()
                            .partial_cmp(&(b.position - x).abs())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|t| t.label.clone())
                    .unwrap_or_default()
            };
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(&figure.x_label).y_desc(&figure.y_label);
            if !figure.x_ticks.is_empty() {
                mesh.x_label_formatter(&tick_formatter);
            }
            mesh.draw().map_err(|e| DbplotError::Writer(e.to_string()))?;

            for s in &figure.series {
                let color = color_of(&s.style);
                match &s.mark {
                    Mark::Line { points, scatter } => {
                        let coords: Vec<(f64, f64)> =
                            points.iter().map(|p| (p.x, p.y)).collect();
                        if !*scatter {
                            match s.style.pattern {
                                LinePattern::Solid => {
                                    chart
                                        .draw_series(LineSeries::new(coords.clone(), &color))
                                        .map_err(|e| DbplotError::Writer(e.to_string()))?;
                                }
                                LinePattern::Dashed => {
                                    chart
                                        .draw_series(DashedLineSeries::new(
                                            coords.clone(),
                                            8,
                                            6,
                                            color.into(),
                                        ))
                                        .map_err(|e| DbplotError::Writer(e.to_string()))?;
                                }
                                LinePattern::Dotted => {
                                    chart
                                        .draw_series(DashedLineSeries::new(
                                            coords.clone(),
                                            2,
                                            4,
                                            color.into(),
                                        ))
                                        .map_err(|e| DbplotError::Writer(e.to_string()))?;
                                }
                                LinePattern::DashDot => {
                                    chart
                                        .draw_series(DashedLineSeries::new(
                                            coords.clone(),
                                            6,
                                            3,
                                            color.into(),
                                        ))
                                        .map_err(|e| DbplotError::Writer(e.to_string()))?;
                                }
                            }
                        }
                        self.draw_markers(&mut chart, &coords, s.style.marker, color)?;
                    }
                    Mark::Bars { bars } => {
                        chart
                            .draw_series(bars.iter().map(|b| {
                                Rectangle::new(
                                    [(b.x, 0.0), (b.x + b.width, b.height)],
                                    color.filled(),
                                )
                            }))
                            .map_err(|e| DbplotError::Writer(e.to_string()))?;
                    }
                }
            }

            // legend from the figure's deduplicated entries
            for entry in &figure.legend {
                let color = color_of(&entry.style);
                let label = entry.label.clone();
                chart
                    .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
                    .map_err(|e| DbplotError::Writer(e.to_string()))?
                    .label(label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color)
                    });
            }
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| DbplotError::Writer(e.to_string()))?;

            root.present().map_err(|e| DbplotError::Writer(e.to_string()))?;
        }
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

impl SvgWriter {
    fn draw_markers<DB: DrawingBackend>(
        &self,
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        coords: &[(f64, f64)],
        marker: Marker,
        color: RGBColor,
    ) -> Result<()> {
        let result = match marker {
            Marker::Circle => chart.draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            ),
            Marker::X => chart.draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| Cross::new((x, y), 3, color.stroke_width(1))),
            ),
            Marker::Plus | Marker::Star => chart.draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| TriangleMarker::new((x, y), 4, color.filled())),
            ),
        };
        result
            .map(|_| ())
            .map_err(|e| DbplotError::Writer(e.to_string()))
    }
}
