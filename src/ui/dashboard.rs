use chrono::Datelike;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::filter::FilteredView;
use crate::data::insights::{group_sums, Totals, NO_DATA};
use crate::data::measure::Measure;
use crate::data::model::ProjectRecord;
use crate::format::{format_number, format_optional};
use crate::state::AppState;

use super::charts::{self, Slice, PLOT_HEIGHT};

// ---------------------------------------------------------------------------
// Dashboard page (central panel)
// ---------------------------------------------------------------------------

/// Render the metrics, charts and project table for the current selection.
pub fn show(ui: &mut Ui, state: &AppState) {
    let view = state.view();
    let colors = &state.color_map;

    ui.heading("Dashboards");
    metrics(ui, &Totals::of(&view));
    ui.separator();

    if view.is_empty() {
        ui.label(RichText::new(NO_DATA).italics());
        return;
    }

    section(ui, "Energy Generated by Energy Type");
    charts::coloured_bars(
        ui,
        "energy_by_type",
        Measure::EnergyGenerated.label(),
        &by_energy_type(&view, Measure::EnergyGenerated, colors),
    );

    section(ui, "Revenue by Energy Type");
    let revenue = by_energy_type(&view, Measure::Revenue, colors);
    ui.horizontal(|ui: &mut Ui| {
        charts::ring_chart(ui, &[revenue.clone()], 0.0);
        ui.vertical(|ui: &mut Ui| charts::legend(ui, &revenue));
    });

    section(ui, "Project-wise Details");
    project_table(ui, &view);

    section(ui, "Energy Generation Over Time");
    energy_over_time(ui, &view, colors);

    section(ui, "ROI by Project");
    project_scatter(ui, "roi_scatter", &view, Measure::Roi);

    section(ui, "Gross Margin by Project");
    match charts::density(&view, Measure::GrossMargin, 10) {
        Some(d) => charts::heatmap(ui, "margin_heatmap", Measure::GrossMargin.label(), &d),
        None => {
            ui.label(RichText::new(NO_DATA).italics());
        }
    }

    section(ui, "CO2 Reduction by Project");
    charts::category_bars(
        ui,
        "co2_by_project",
        Measure::Co2Reduction.label(),
        &per_row(&view, Measure::Co2Reduction),
        Color32::from_rgb(46, 160, 67),
    );

    section(ui, "Efficiency vs Revenue");
    scatter_by_type(ui, &view, colors, Measure::Efficiency, Measure::Revenue, None);

    section(ui, "Energy Generation by Energy Type and Project");
    ui.horizontal(|ui: &mut Ui| {
        let (inner, outer) = sunburst(&view, colors);
        charts::ring_chart(ui, &[inner.clone(), outer], 30.0);
        ui.vertical(|ui: &mut Ui| charts::legend(ui, &inner));
    });

    section(ui, "Revenue vs CO2 Reduction");
    scatter_by_type(
        ui,
        &view,
        colors,
        Measure::Revenue,
        Measure::Co2Reduction,
        Some(Measure::EnergyGenerated),
    );

    section(ui, "Project Status Insights");
    charts::horizontal_bars(ui, "status_distribution", "Projects", &status_distribution(&view));

    section(ui, "Efficiency Insights");
    for (id, measure, color) in [
        ("efficiency_by_project", Measure::Efficiency, Color32::from_rgb(99, 110, 250)),
        ("margin_by_project", Measure::GrossMargin, Color32::from_rgb(239, 85, 59)),
        ("cost_eff_by_project", Measure::CostEfficiency, Color32::from_rgb(0, 204, 150)),
        ("roi_by_project", Measure::Roi, Color32::from_rgb(171, 99, 250)),
    ] {
        ui.label(format!("{} by Project:", measure.label()));
        charts::category_bars(ui, id, measure.label(), &per_row(&view, measure), color);
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn metrics(ui: &mut Ui, totals: &Totals) {
    let cards = [
        ("Total Energy Generated (MWh)", format_number(totals.energy_mwh, 0)),
        ("Total Revenue (USD)", format!("${}", format_number(totals.revenue_usd, 0))),
        ("Total CO2 Reduction (tons)", format_number(totals.co2_reduction_tons, 0)),
        ("Total Profit (USD)", format!("${}", format_number(totals.profit_usd, 0))),
    ];
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, value) in cards {
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(label);
                    ui.label(RichText::new(value).size(24.0).strong());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Series preparation
// ---------------------------------------------------------------------------

fn energy_type(r: &ProjectRecord) -> &str {
    &r.energy_type
}

fn by_energy_type(view: &FilteredView, measure: Measure, colors: &ColorMap) -> Vec<Slice> {
    group_sums(view, energy_type, measure)
        .into_iter()
        .map(|g| Slice {
            color: colors.color_for(&g.group),
            label: g.group,
            value: g.total,
        })
        .collect()
}

/// One entry per row, labelled by project name.
fn per_row(view: &FilteredView, measure: Measure) -> Vec<(String, Option<f64>)> {
    view.iter()
        .map(|r| (r.project_name.clone(), measure.value(r)))
        .collect()
}

/// Inner ring: energy per type. Outer ring: energy per project, grouped under its type.
fn sunburst(view: &FilteredView, colors: &ColorMap) -> (Vec<Slice>, Vec<Slice>) {
    let inner = by_energy_type(view, Measure::EnergyGenerated, colors);
    let mut outer = Vec::new();
    for kind in &inner {
        let base = kind.color;
        let projects: Vec<&ProjectRecord> =
            view.iter().filter(|r| r.energy_type == kind.label).collect();
        let mut seen: Vec<Slice> = Vec::new();
        for r in projects {
            let v = r.energy_generated_mwh.unwrap_or(0.0);
            match seen.iter_mut().find(|s| s.label == r.project_name) {
                Some(s) => s.value += v,
                None => seen.push(Slice {
                    label: r.project_name.clone(),
                    value: v,
                    color: base,
                }),
            }
        }
        let n = seen.len().max(1) as f32;
        for (i, s) in seen.iter_mut().enumerate() {
            s.color = s.color.gamma_multiply(1.0 - 0.5 * i as f32 / n);
        }
        outer.extend(seen);
    }
    (inner, outer)
}

fn status_distribution(view: &FilteredView) -> Vec<Slice> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for r in view.iter() {
        let label = r.status.label();
        match counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }
    counts
        .into_iter()
        .map(|(label, n)| Slice {
            label,
            value: n as f64,
            color: Color32::from_rgb(99, 110, 250),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

fn energy_over_time(ui: &mut Ui, view: &FilteredView, colors: &ColorMap) {
    let kinds: Vec<String> = group_sums(view, energy_type, Measure::EnergyGenerated)
        .into_iter()
        .map(|g| g.group)
        .collect();

    Plot::new("energy_over_time")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Start Date")
        .y_axis_label(Measure::EnergyGenerated.label())
        .x_axis_formatter(charts::date_axis())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for kind in &kinds {
                let mut pts: Vec<[f64; 2]> = view
                    .iter()
                    .filter(|r| &r.energy_type == kind)
                    .filter_map(|r| {
                        let y = r.energy_generated_mwh?;
                        Some([r.start_date.num_days_from_ce() as f64, y])
                    })
                    .collect();
                pts.sort_by(|a, b| a[0].total_cmp(&b[0]));
                plot_ui.line(
                    Line::new(PlotPoints::from(pts))
                        .name(kind)
                        .color(colors.color_for(kind))
                        .width(2.0),
                );
            }
        });
}

fn project_scatter(ui: &mut Ui, id: &str, view: &FilteredView, measure: Measure) {
    let rows = per_row(view, measure);
    let labels: Vec<String> = rows.iter().map(|(l, _)| l.clone()).collect();
    let pts: Vec<[f64; 2]> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, (_, v))| v.map(|v| [i as f64, v]))
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(measure.label())
        .x_axis_formatter(charts::category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(pts))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(5.0)
                    .name(measure.label()),
            );
        });
}

/// Scatter of `x` against `y`, one series per energy type. With `size`, each
/// point's radius scales with that measure (bubble chart).
fn scatter_by_type(
    ui: &mut Ui,
    view: &FilteredView,
    colors: &ColorMap,
    x: Measure,
    y: Measure,
    size: Option<Measure>,
) {
    let id = format!("{}_vs_{}", x.label(), y.label());
    let max_size = size
        .map(|m| view.iter().filter_map(|r| m.value(r)).fold(0.0, f64::max))
        .unwrap_or(0.0);

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for r in view.iter() {
                let (Some(px), Some(py)) = (x.value(r), y.value(r)) else {
                    continue;
                };
                let radius = match size.and_then(|m| m.value(r)) {
                    Some(s) if max_size > 0.0 => 4.0 + 20.0 * (s / max_size).max(0.0).sqrt() as f32,
                    _ => 5.0,
                };
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[px, py]]))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius)
                        .color(colors.color_for(&r.energy_type))
                        .name(&r.energy_type),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

const TABLE_MEASURES: [(Measure, usize); 11] = [
    (Measure::InstalledCapacity, 0),
    (Measure::EnergyGenerated, 0),
    (Measure::Revenue, 0),
    (Measure::Co2Reduction, 0),
    (Measure::Profit, 0),
    (Measure::OperationalCost, 0),
    (Measure::Efficiency, 2),
    (Measure::GrossMargin, 2),
    (Measure::CostEfficiency, 2),
    (Measure::Roi, 2),
    (Measure::RevenuePerMwh, 2),
];

fn project_table(ui: &mut Ui, view: &FilteredView) {
    egui::ScrollArea::horizontal()
        .id_salt("project_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(true)
                .max_scroll_height(320.0)
                .column(Column::auto().at_least(140.0))
                .columns(Column::auto().at_least(90.0), TABLE_MEASURES.len())
                .header(22.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("Project Name");
                    });
                    for (m, _) in TABLE_MEASURES {
                        header.col(|ui: &mut Ui| {
                            ui.strong(m.label());
                        });
                    }
                })
                .body(|mut body| {
                    for r in view.iter() {
                        body.row(20.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.label(r.project_name.as_str());
                            });
                            for (m, decimals) in TABLE_MEASURES {
                                row.col(|ui: &mut Ui| {
                                    ui.label(format_optional(m.value(r), decimals));
                                });
                            }
                        });
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::record;
    use crate::data::model::{ProjectStatus, ProjectTable};

    fn table() -> ProjectTable {
        let mut a = record("Sunfield", "North", "Solar");
        a.energy_generated_mwh = Some(100.0);
        let mut b = record("Gale Ridge", "North", "Wind");
        b.energy_generated_mwh = Some(300.0);
        b.status = ProjectStatus::Planned;
        let mut c = record("Sunfield", "South", "Solar");
        c.energy_generated_mwh = Some(50.0);
        ProjectTable::new(vec![a, b, c])
    }

    #[test]
    fn sunburst_rings_share_the_same_total() {
        let t = table();
        let view = FilteredView::all(&t);
        let colors = ColorMap::new(&t.energy_types);
        let (inner, outer) = sunburst(&view, &colors);

        let sum = |s: &[Slice]| s.iter().map(|x| x.value).sum::<f64>();
        assert_eq!(sum(&inner), sum(&outer));
        assert_eq!(
            outer.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
            vec!["Sunfield", "Gale Ridge"]
        );
        assert_eq!(outer[0].value, 150.0);
    }

    #[test]
    fn status_distribution_counts_each_label() {
        let t = table();
        let view = FilteredView::all(&t);
        let dist = status_distribution(&view);
        let pairs: Vec<(&str, f64)> = dist.iter().map(|s| (s.label.as_str(), s.value)).collect();
        assert_eq!(pairs, vec![("Operational", 2.0), ("Planned", 1.0)]);
    }
}
