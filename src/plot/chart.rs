//! Multi-axis line chart rendered to SVG with Plotters.
//!
//! Plotters supports at most a primary and a secondary y axis, so every trace is
//! normalized into `[0, 1]` using the range of the axis it belongs to, drawn on a
//! single unit-height chart, and the four value axes are drawn by hand next to
//! the plotting area with tick labels in their original units.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use log::warn;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{AxisSlot, ChartSpec, DashStyle, DateWindow, Rgb, Series};
use crate::error::AppError;

/// Horizontal room reserved per value axis (tick labels + gap).
const AXIS_GAP: i32 = 72;
const TICKS: i32 = 5;
const FONT: &str = "sans-serif";

/// Pixel bounds of the plotting area inside the SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PlotArea {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Value range of one axis, padded so lines never touch the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub lo: f64,
    pub hi: f64,
}

impl AxisRange {
    /// Range over `values` with 5% padding. Degenerate inputs get a unit range.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !(lo.is_finite() && hi.is_finite()) {
            return Self { lo: 0.0, hi: 1.0 };
        }
        if (hi - lo).abs() < 1e-12 {
            let pad = if lo.abs() > 1e-12 { lo.abs() * 0.05 } else { 1.0 };
            return Self {
                lo: lo - pad,
                hi: hi + pad,
            };
        }
        let pad = (hi - lo) * 0.05;
        Self {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    pub fn normalize(&self, v: f64) -> f64 {
        (v - self.lo) / (self.hi - self.lo)
    }

    pub fn denormalize(&self, u: f64) -> f64 {
        self.lo + u * (self.hi - self.lo)
    }
}

/// SVG text plus the geometry needed to make it interactive.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub svg: String,
    pub area: PlotArea,
    pub start: NaiveDate,
    /// Days spanned by the x axis.
    pub days: i64,
    pub ranges: HashMap<AxisSlot, AxisRange>,
}

/// Render `series` (already aligned) according to `spec` over `window`.
pub fn render_svg(series: &[Series], spec: &ChartSpec, window: &DateWindow) -> Result<RenderedChart, AppError> {
    let by_name: HashMap<&str, &Series> = series.iter().map(|s| (s.name.as_str(), s)).collect();
    for trace in &spec.traces {
        if !by_name.contains_key(trace.series.as_str()) {
            warn!("No series named '{}' for trace '{}'", trace.series, trace.label);
        }
    }

    let ranges = axis_ranges(spec, &by_name);
    let start = window.start();
    let days = (window.end() - start).num_days().max(1);

    let mut svg = String::new();
    let area = {
        let root = SVGBackend::with_string(&mut svg, (spec.width, spec.height)).into_drawing_area();
        let area = draw(&root, spec, &by_name, &ranges, start, days)
            .map_err(|e| AppError::new(4, format!("Failed to render chart: {e}")))?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Failed to finish chart SVG: {e}")))?;
        area
    };

    Ok(RenderedChart {
        svg,
        area,
        start,
        days,
        ranges,
    })
}

fn axis_ranges(spec: &ChartSpec, by_name: &HashMap<&str, &Series>) -> HashMap<AxisSlot, AxisRange> {
    spec.used_axes()
        .into_iter()
        .map(|slot| {
            let values = spec
                .traces_on(slot)
                .filter_map(|t| by_name.get(t.series.as_str()))
                .flat_map(|s| s.points.iter().filter_map(|p| p.value));
            (slot, AxisRange::from_values(values))
        })
        .collect()
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    by_name: &HashMap<&str, &Series>,
    ranges: &HashMap<AxisSlot, AxisRange>,
    start: NaiveDate,
    days: i64,
) -> Result<PlotArea, Box<dyn std::error::Error>> {
    root.fill(&WHITE)?;

    let used = spec.used_axes();
    let left_axes = used
        .iter()
        .filter(|s| matches!(s, AxisSlot::Left | AxisSlot::LeftOuter))
        .count()
        .max(1) as i32;
    let right_axes = used
        .iter()
        .filter(|s| matches!(s, AxisSlot::Right | AxisSlot::RightOuter))
        .count() as i32;

    let fmt_x = |v: &f64| (start + Duration::days(v.round() as i64)).format("%Y-%m").to_string();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 22))
        .margin(20)
        .margin_top(30)
        .set_label_area_size(LabelAreaPosition::Left, AXIS_GAP * left_axes)
        .set_label_area_size(LabelAreaPosition::Right, AXIS_GAP * right_axes)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(0f64..days as f64, 0f64..1f64)?;

    // Only the x axis comes from the mesh; y gridlines line up with the hand-drawn ticks.
    chart
        .configure_mesh()
        .x_labels(12)
        .y_labels(TICKS as usize + 1)
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|_: &f64| String::new())
        .x_desc(spec.x_title.as_str())
        .label_style((FONT, 13).into_font().color(&BLACK))
        .axis_style(&BLACK)
        .bold_line_style(&BLACK.mix(0.12))
        .light_line_style(&WHITE)
        .draw()?;

    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    let area = PlotArea {
        left: x_px.start,
        right: x_px.end,
        top: y_px.start,
        bottom: y_px.end,
    };

    for trace in &spec.traces {
        let Some(range) = ranges.get(&trace.axis) else { continue };
        let color = to_rgb(trace.color);
        let style = color.stroke_width(trace.width);

        // Legend entry, independent of how many segments get drawn.
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(trace.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));

        let Some(series) = by_name.get(trace.series.as_str()) else { continue };
        for segment in segments(series, start, range) {
            let layers = dash_layers(trace.dash);
            if layers.is_empty() {
                chart.draw_series(LineSeries::new(segment, style))?;
                continue;
            }
            for (size, spacing) in layers {
                chart.draw_series(DashedLineSeries::new(segment.clone(), size, spacing, style))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, 13))
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    for slot in used {
        if let Some(range) = ranges.get(&slot) {
            draw_value_axis(root, &area, slot, range, spec)?;
        }
    }

    Ok(area)
}

fn draw_value_axis(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    area: &PlotArea,
    slot: AxisSlot,
    range: &AxisRange,
    spec: &ChartSpec,
) -> Result<(), Box<dyn std::error::Error>> {
    let x = axis_x(area, slot);
    let on_left = matches!(slot, AxisSlot::Left | AxisSlot::LeftOuter);
    let color = spec
        .traces_on(slot)
        .next()
        .map(|t| to_rgb(t.color))
        .unwrap_or(BLACK);

    root.draw(&PathElement::new(vec![(x, area.top), (x, area.bottom)], BLACK.stroke_width(1)))?;

    let (tick_dx, anchor) = if on_left { (-6, HPos::Right) } else { (6, HPos::Left) };
    let label_style = (FONT, 12).into_font().color(&BLACK).pos(Pos::new(anchor, VPos::Center));
    let span = range.hi - range.lo;
    for i in 0..=TICKS {
        let u = i as f64 / TICKS as f64;
        let y = area.bottom - ((area.bottom - area.top) as f64 * u).round() as i32;
        root.draw(&PathElement::new(vec![(x, y), (x + tick_dx / 2, y)], BLACK.stroke_width(1)))?;
        root.draw(&Text::new(
            format_tick(range.denormalize(u), span),
            (x + tick_dx, y),
            label_style.clone(),
        ))?;
    }

    let title_style = (FONT, 13)
        .into_font()
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw(&Text::new(
        spec.axis_title(slot).to_string(),
        (x, area.top - 8),
        title_style,
    ))?;
    Ok(())
}

fn axis_x(area: &PlotArea, slot: AxisSlot) -> i32 {
    match slot {
        AxisSlot::Left => area.left,
        AxisSlot::LeftOuter => area.left - AXIS_GAP,
        AxisSlot::Right => area.right,
        AxisSlot::RightOuter => area.right + AXIS_GAP,
    }
}

/// Split a series into contiguous runs of non-null points, in chart coordinates
/// (x in days since `start`, y normalized to the axis range). Nulls break lines.
pub fn segments(series: &Series, start: NaiveDate, range: &AxisRange) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for p in &series.points {
        match p.value {
            Some(v) => {
                let x = (p.date - start).num_days() as f64;
                current.push((x, range.normalize(v)));
            }
            None => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// `(dash, gap)` pixel lengths of the dashed passes drawn for a style; empty
/// means one solid line.
///
/// Dash-dot overlays a dotted pass whose period divides the dash period, so
/// every second dot lands inside a dash and the other sits in the gap.
pub fn dash_layers(dash: DashStyle) -> Vec<(u32, u32)> {
    match dash {
        DashStyle::Solid => Vec::new(),
        DashStyle::Dash => vec![(10, 6)],
        DashStyle::Dot => vec![(2, 4)],
        DashStyle::DashDot => vec![(6, 14), (2, 8)],
    }
}

/// Tick label with precision scaled to the axis span.
pub fn format_tick(v: f64, span: f64) -> String {
    let decimals = if span >= 50.0 {
        0
    } else if span >= 5.0 {
        1
    } else {
        2
    };
    format!("{v:.decimals$}")
}

fn to_rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}
