use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoints, Polygon};

use crate::color::ramp;
use crate::data::filter::FilteredView;
use crate::data::insights::group_sums;
use crate::data::measure::Measure;

pub const PLOT_HEIGHT: f32 = 260.0;

/// One labelled, coloured value of a bar, pie or ring chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Color32,
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Axis formatter that prints `labels[i]` at integer position `i`.
pub fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let x = mark.value;
        if x.fract().abs() > f64::EPSILON || x < 0.0 {
            return String::new();
        }
        labels.get(x as usize).cloned().unwrap_or_default()
    }
}

/// Axis formatter for day numbers produced by `NaiveDate::num_days_from_ce`.
pub fn date_axis() -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    |mark: GridMark, _range: &RangeInclusive<f64>| {
        chrono::NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bar per category. `None` values leave a gap.
pub fn category_bars(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    items: &[(String, Option<f64>)],
    color: Color32,
) {
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let bars: Vec<Bar> = items
        .iter()
        .enumerate()
        .filter_map(|(i, (label, v))| {
            v.map(|v| Bar::new(i as f64, v).name(label).fill(color).width(0.7))
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

/// Vertical bar per slice, each in its own colour.
pub fn coloured_bars(ui: &mut Ui, id: &str, y_label: &str, slices: &[Slice]) {
    let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();
    let bars: Vec<Bar> = slices
        .iter()
        .enumerate()
        .map(|(i, s)| Bar::new(i as f64, s.value).name(&s.label).fill(s.color).width(0.7))
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Horizontal bar per slice, categories on the y axis.
pub fn horizontal_bars(ui: &mut Ui, id: &str, x_label: &str, slices: &[Slice]) {
    let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();
    let bars: Vec<Bar> = slices
        .iter()
        .enumerate()
        .map(|(i, s)| Bar::new(i as f64, s.value).name(&s.label).fill(s.color).width(0.6))
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT * 0.7)
        .x_axis_label(x_label)
        .y_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Pie and sunburst
// ---------------------------------------------------------------------------

const RING_STEP_RAD: f32 = 0.03;

/// Concentric rings; ring 0 is innermost. Each ring spans the full circle,
/// so rings whose totals match line up slice-for-slice.
pub fn ring_chart(ui: &mut Ui, rings: &[Vec<Slice>], hole: f32) {
    let size = Vec2::splat(PLOT_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let center = response.rect.center();
    let radius = size.x * 0.45;
    let band = (radius - hole) / rings.len().max(1) as f32;

    for (depth, ring) in rings.iter().enumerate() {
        let r_in = hole + band * depth as f32;
        let r_out = r_in + band;
        let total: f64 = ring.iter().map(|s| s.value.max(0.0)).sum();
        if total <= 0.0 {
            continue;
        }
        let mut start = -std::f32::consts::FRAC_PI_2;
        for slice in ring {
            let sweep = (slice.value.max(0.0) / total) as f32 * std::f32::consts::TAU;
            if sweep <= 0.0 {
                continue;
            }
            annular_sector(&painter, center, r_in, r_out, start, start + sweep, slice.color);
            start += sweep;
        }
    }
}

fn annular_sector(
    painter: &egui::Painter,
    center: Pos2,
    r_in: f32,
    r_out: f32,
    from: f32,
    to: f32,
    fill: Color32,
) {
    let at = |r: f32, a: f32| center + Vec2::new(a.cos(), a.sin()) * r;
    let steps = ((to - from) / RING_STEP_RAD).ceil().max(1.0) as usize;
    let step = (to - from) / steps as f32;
    for k in 0..steps {
        let a0 = from + step * k as f32;
        let a1 = a0 + step;
        let quad = vec![at(r_in, a0), at(r_out, a0), at(r_out, a1), at(r_in, a1)];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
    let edge = Stroke::new(1.0, Color32::from_gray(30));
    painter.line_segment([at(r_in, from), at(r_out, from)], edge);
}

/// Colour key with each slice's share of the total.
pub fn legend(ui: &mut Ui, slices: &[Slice]) {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    for s in slices {
        let pct = if total > 0.0 { s.value.max(0.0) / total * 100.0 } else { 0.0 };
        ui.colored_label(s.color, format!("■ {} ({pct:.1}%)", s.label));
    }
}

// ---------------------------------------------------------------------------
// Density heatmap
// ---------------------------------------------------------------------------

/// Counts of rows per (category, value bin).
#[derive(Debug, Clone, PartialEq)]
pub struct Density {
    pub columns: Vec<String>,
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    /// `counts[column][bin]`
    pub counts: Vec<Vec<usize>>,
}

impl Density {
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Bin `measure` per project name. Undefined values are left out.
pub fn density(view: &FilteredView, measure: Measure, bins: usize) -> Option<Density> {
    let values: Vec<(&str, f64)> = view
        .iter()
        .filter_map(|r| measure.value(r).map(|v| (r.project_name.as_str(), v)))
        .collect();
    if values.is_empty() || bins == 0 {
        return None;
    }
    let lo = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let hi = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let columns: Vec<String> = group_sums(view, |r| r.project_name.as_str(), measure)
        .into_iter()
        .map(|g| g.group)
        .collect();
    let mut counts = vec![vec![0usize; bins]; columns.len()];
    for (name, v) in values {
        let Some(col) = columns.iter().position(|c| c == name) else {
            continue;
        };
        let bin = (((v - lo) / width) as usize).min(bins - 1);
        counts[col][bin] += 1;
    }
    Some(Density {
        columns,
        edges,
        counts,
    })
}

pub fn heatmap(ui: &mut Ui, id: &str, y_label: &str, density: &Density) {
    let max = density.max_count().max(1) as f32;
    let low = Color32::from_rgb(13, 8, 135);
    let high = Color32::from_rgb(240, 249, 33);

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(density.columns.clone()))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (c, column) in density.counts.iter().enumerate() {
                for (b, &count) in column.iter().enumerate() {
                    if count == 0 {
                        continue;
                    }
                    let (x0, x1) = (c as f64 - 0.5, c as f64 + 0.5);
                    let (y0, y1) = (density.edges[b], density.edges[b + 1]);
                    let cell: PlotPoints = vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]].into();
                    let fill = ramp(low, high, count as f32 / max);
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, fill))
                            .name(format!("{count}")),
                    );
                }
            }
        });
}
