use std::collections::HashMap;
use std::fmt;

use crate::format::{format_number, format_plain};

use super::filter::FilteredView;
use super::measure::Measure;
use super::model::{ProjectRecord, ProjectStatus};

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Summed measure for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub group: String,
    pub total: f64,
}

/// The row holding the largest value of a measure.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMax {
    pub project_name: String,
    pub value: f64,
}

/// Sum `measure` per group, groups in order of first appearance in the view.
///
/// Missing values are skipped, so a group with only missing values sums to 0.
pub fn group_sums<K>(view: &FilteredView, key: K, measure: Measure) -> Vec<GroupSum>
where
    K: Fn(&ProjectRecord) -> &str,
{
    let mut sums: Vec<GroupSum> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for r in view.iter() {
        let group = key(r);
        let idx = *slot.entry(group).or_insert_with(|| {
            sums.push(GroupSum {
                group: group.to_string(),
                total: 0.0,
            });
            sums.len() - 1
        });
        if let Some(v) = measure.value(r) {
            sums[idx].total += v;
        }
    }
    sums
}

/// The group with the largest summed `measure`; the earliest group wins ties.
///
/// `None` when the view is empty.
pub fn max_by_group_sum<K>(view: &FilteredView, key: K, measure: Measure) -> Option<GroupSum>
where
    K: Fn(&ProjectRecord) -> &str,
{
    group_sums(view, key, measure)
        .into_iter()
        .fold(None, |best: Option<GroupSum>, g| match best {
            Some(b) if g.total <= b.total => Some(b),
            _ => Some(g),
        })
}

/// The row with the largest defined `measure`; the earliest row wins ties.
///
/// `None` when no row in the view has a defined value.
pub fn max_by_row(view: &FilteredView, measure: Measure) -> Option<RowMax> {
    let mut best: Option<(&ProjectRecord, f64)> = None;
    for r in view.iter() {
        let Some(v) = measure.value(r) else {
            continue;
        };
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((r, v));
        }
    }
    best.map(|(r, value)| RowMax {
        project_name: r.project_name.clone(),
        value,
    })
}

/// Rows per known status; unknown statuses are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub operational: usize,
    pub under_construction: usize,
    pub planned: usize,
}

impl StatusCounts {
    pub fn of(view: &FilteredView) -> Self {
        let mut c = StatusCounts::default();
        for r in view.iter() {
            match r.status {
                ProjectStatus::Operational => c.operational += 1,
                ProjectStatus::UnderConstruction => c.under_construction += 1,
                ProjectStatus::Planned => c.planned += 1,
                ProjectStatus::Other(_) => {}
            }
        }
        c
    }
}

/// Headline sums for the dashboard metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub energy_mwh: f64,
    pub revenue_usd: f64,
    pub co2_reduction_tons: f64,
    pub profit_usd: f64,
}

impl Totals {
    pub fn of(view: &FilteredView) -> Self {
        let sum = |m: Measure| view.iter().filter_map(|r| m.value(r)).sum::<f64>();
        Totals {
            energy_mwh: sum(Measure::EnergyGenerated),
            revenue_usd: sum(Measure::Revenue),
            co2_reduction_tons: sum(Measure::Co2Reduction),
            profit_usd: sum(Measure::Profit),
        }
    }
}

// ---------------------------------------------------------------------------
// Insight sentences
// ---------------------------------------------------------------------------

pub const NO_DATA: &str = "No data available for the current selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    EnergyGeneration,
    Revenue,
    Co2Reduction,
    Profit,
    InstalledCapacity,
    ProjectStatus,
    Efficiency,
    GrossMargin,
    Roi,
}

impl InsightKind {
    pub fn title(self) -> &'static str {
        match self {
            InsightKind::EnergyGeneration => "Energy Generation Insight",
            InsightKind::Revenue => "Revenue Insight",
            InsightKind::Co2Reduction => "CO2 Reduction Insight",
            InsightKind::Profit => "Profit Insight",
            InsightKind::InstalledCapacity => "Installed Capacity Insight",
            InsightKind::ProjectStatus => "Project Status Insight",
            InsightKind::Efficiency => "Efficiency Insight",
            InsightKind::GrossMargin => "Gross Margin Insight",
            InsightKind::Roi => "ROI Insight",
        }
    }
}

/// A computed sentence, or the explicit marker that nothing could be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightValue {
    Sentence(String),
    NoData,
}

impl fmt::Display for InsightValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightValue::Sentence(s) => f.write_str(s),
            InsightValue::NoData => f.write_str(NO_DATA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub kind: InsightKind,
    pub value: InsightValue,
}

impl Insight {
    fn from_option(kind: InsightKind, sentence: Option<String>) -> Self {
        Insight {
            kind,
            value: sentence.map_or(InsightValue::NoData, InsightValue::Sentence),
        }
    }

    pub fn has_data(&self) -> bool {
        self.value != InsightValue::NoData
    }
}

fn energy_type(r: &ProjectRecord) -> &str {
    &r.energy_type
}

/// The nine "Key Insights" sentences for the current view, in display order.
pub fn key_insights(view: &FilteredView) -> Vec<Insight> {
    let top_type = |m: Measure| max_by_group_sum(view, energy_type, m);
    let status = StatusCounts::of(view);

    vec![
        Insight::from_option(
            InsightKind::EnergyGeneration,
            top_type(Measure::EnergyGenerated).map(|g| {
                format!(
                    "{} projects contribute the most to energy generation with a total of {} MWh.",
                    g.group,
                    format_number(g.total, 0)
                )
            }),
        ),
        Insight::from_option(
            InsightKind::Revenue,
            top_type(Measure::Revenue).map(|g| {
                format!(
                    "{} projects contribute the most to revenue, generating a total of ${}.",
                    g.group,
                    format_number(g.total, 0)
                )
            }),
        ),
        Insight::from_option(
            InsightKind::Co2Reduction,
            top_type(Measure::Co2Reduction).map(|g| {
                format!(
                    "{} projects contribute the most to CO2 reduction, with a total of {} tons of CO2 reduced.",
                    g.group,
                    format_number(g.total, 0)
                )
            }),
        ),
        Insight::from_option(
            InsightKind::Profit,
            top_type(Measure::Profit).map(|g| {
                format!(
                    "{} projects contribute the most to profit, generating a total of ${}.",
                    g.group,
                    format_number(g.total, 0)
                )
            }),
        ),
        Insight::from_option(
            InsightKind::InstalledCapacity,
            max_by_row(view, Measure::InstalledCapacity).map(|m| {
                format!(
                    "The project with the largest installed capacity is {} with {} MW.",
                    m.project_name,
                    format_plain(m.value)
                )
            }),
        ),
        Insight::from_option(
            InsightKind::ProjectStatus,
            Some(format!(
                "There are {} operational projects, {} under construction, and {} planned projects.",
                status.operational, status.under_construction, status.planned
            )),
        ),
        Insight::from_option(
            InsightKind::Efficiency,
            max_by_row(view, Measure::Efficiency).map(|m| {
                format!(
                    "The project with the highest efficiency is {} with an efficiency of {:.2} USD/MWh.",
                    m.project_name, m.value
                )
            }),
        ),
        Insight::from_option(
            InsightKind::GrossMargin,
            max_by_row(view, Measure::GrossMargin).map(|m| {
                format!(
                    "The project with the highest gross margin is {} with a gross margin of {:.2}%.",
                    m.project_name, m.value
                )
            }),
        ),
        Insight::from_option(
            InsightKind::Roi,
            max_by_row(view, Measure::Roi).map(|m| {
                format!(
                    "The project with the highest ROI is {} with an ROI of {:.2}%.",
                    m.project_name, m.value
                )
            }),
        ),
    ]
}

// ---------------------------------------------------------------------------
// KPI definitions
// ---------------------------------------------------------------------------

pub struct KpiDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub formula: &'static str,
}

/// Explanations shown above the insights.
pub const KPI_DEFINITIONS: [KpiDefinition; 5] = [
    KpiDefinition {
        name: "Efficiency (USD/MWh)",
        description: "Profit generated per MWh of energy generated.",
        formula: "Profit / Energy Generated (MWh)",
    },
    KpiDefinition {
        name: "Gross Margin (%)",
        description: "Percentage of revenue that is gross profit.",
        formula: "(Profit / Revenue) * 100",
    },
    KpiDefinition {
        name: "Cost Efficiency (USD/MWh)",
        description: "Operational cost incurred per MWh of energy generated.",
        formula: "Operational Cost / Energy Generated (MWh)",
    },
    KpiDefinition {
        name: "ROI (%)",
        description: "Return on investment from the operational cost.",
        formula: "(Profit / Operational Cost) * 100",
    },
    KpiDefinition {
        name: "Revenue per MWh (USD)",
        description: "Revenue generated per MWh of energy produced.",
        formula: "Revenue / Energy Generated (MWh)",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterDimension, FilterSelection};
    use crate::data::model::fixtures::record;
    use crate::data::model::ProjectTable;

    fn table() -> ProjectTable {
        let mut sun = record("Sunfield", "North", "Solar");
        sun.energy_generated_mwh = Some(500.0);
        sun.revenue_usd = Some(2_000_000.0);
        sun.profit_usd = Some(400_000.0);
        sun.operational_cost_usd = Some(1_600_000.0);
        sun.installed_capacity_mw = Some(150.0);

        let mut gale = record("Gale Ridge", "South", "Wind");
        gale.energy_generated_mwh = Some(1_200.0);
        gale.revenue_usd = Some(1_500_000.0);
        gale.profit_usd = Some(600_000.0);
        gale.operational_cost_usd = Some(900_000.0);
        gale.installed_capacity_mw = Some(90.5);
        gale.status = ProjectStatus::UnderConstruction;

        let mut dune = record("Dune Array", "South", "Solar");
        dune.energy_generated_mwh = Some(0.0);
        dune.revenue_usd = Some(0.0);
        dune.profit_usd = Some(0.0);
        dune.operational_cost_usd = Some(0.0);
        dune.installed_capacity_mw = Some(150.0);
        dune.status = ProjectStatus::Planned;

        ProjectTable::new(vec![sun, gale, dune])
    }

    #[test]
    fn group_sums_follow_first_appearance() {
        let t = table();
        let view = FilteredView::all(&t);
        let sums = group_sums(&view, energy_type, Measure::EnergyGenerated);
        assert_eq!(
            sums,
            vec![
                GroupSum { group: "Solar".into(), total: 500.0 },
                GroupSum { group: "Wind".into(), total: 1_200.0 },
            ]
        );
    }

    #[test]
    fn max_group_sum_picks_largest() {
        let t = table();
        let view = FilteredView::all(&t);
        let top = max_by_group_sum(&view, energy_type, Measure::Revenue).unwrap();
        assert_eq!(top.group, "Solar");
        assert_eq!(top.total, 2_000_000.0);
    }

    #[test]
    fn group_sum_ties_resolve_to_first_in_row_order() {
        let mut wind = record("W", "North", "Wind");
        wind.revenue_usd = Some(10.0);
        let mut solar = record("S", "North", "Solar");
        solar.revenue_usd = Some(10.0);
        let t = ProjectTable::new(vec![wind, solar]);
        let view = FilteredView::all(&t);
        let top = max_by_group_sum(&view, energy_type, Measure::Revenue).unwrap();
        assert_eq!(top.group, "Wind");
    }

    #[test]
    fn row_max_ties_resolve_to_first_row_and_skip_undefined() {
        let t = table();
        let view = FilteredView::all(&t);
        let cap = max_by_row(&view, Measure::InstalledCapacity).unwrap();
        assert_eq!(cap.project_name, "Sunfield");

        // Dune Array has undefined efficiency; the max is among defined rows.
        let eff = max_by_row(&view, Measure::Efficiency).unwrap();
        assert_eq!(eff.project_name, "Sunfield");
        assert_eq!(eff.value, 800.0);
    }

    #[test]
    fn row_max_is_none_when_every_value_is_undefined() {
        let t = table();
        let mut sel = FilterSelection::default();
        sel.toggle(FilterDimension::Project, "Dune Array");
        let view = FilteredView::new(&t, &sel);
        assert_eq!(max_by_row(&view, Measure::Roi), None);
        assert!(max_by_row(&view, Measure::InstalledCapacity).is_some());
    }

    #[test]
    fn status_counts_and_totals() {
        let t = table();
        let view = FilteredView::all(&t);
        assert_eq!(
            StatusCounts::of(&view),
            StatusCounts { operational: 1, under_construction: 1, planned: 1 }
        );
        let totals = Totals::of(&view);
        assert_eq!(totals.energy_mwh, 1_700.0);
        assert_eq!(totals.profit_usd, 1_000_000.0);
    }

    #[test]
    fn unknown_statuses_are_not_counted() {
        let mut retired = record("Old Mill", "East", "Hydro");
        retired.status = ProjectStatus::parse("Decommissioned");
        let t = ProjectTable::new(vec![retired, record("Sunfield", "North", "Solar")]);
        let view = FilteredView::all(&t);

        assert_eq!(
            StatusCounts::of(&view),
            StatusCounts { operational: 1, under_construction: 0, planned: 0 }
        );
        assert_eq!(
            key_insights(&view)[5].value.to_string(),
            "There are 1 operational projects, 0 under construction, and 0 planned projects."
        );
    }

    #[test]
    fn insight_sentences_are_formatted() {
        let t = table();
        let view = FilteredView::all(&t);
        let insights = key_insights(&view);
        let text: Vec<String> = insights.iter().map(|i| i.value.to_string()).collect();

        assert_eq!(insights.len(), 9);
        assert_eq!(
            text[0],
            "Wind projects contribute the most to energy generation with a total of 1,200 MWh."
        );
        assert_eq!(
            text[1],
            "Solar projects contribute the most to revenue, generating a total of $2,000,000."
        );
        assert_eq!(
            text[4],
            "The project with the largest installed capacity is Sunfield with 150 MW."
        );
        assert_eq!(
            text[5],
            "There are 1 operational projects, 1 under construction, and 1 planned projects."
        );
        assert_eq!(
            text[8],
            "The project with the highest ROI is Gale Ridge with an ROI of 66.67%."
        );
    }

    #[test]
    fn empty_view_reports_no_data_for_every_max_insight() {
        let t = table();
        let mut sel = FilterSelection::default();
        sel.toggle(FilterDimension::Region, "Nowhere");
        let view = FilteredView::new(&t, &sel);
        assert!(view.is_empty());

        for insight in key_insights(&view) {
            if insight.kind == InsightKind::ProjectStatus {
                assert!(insight.has_data());
            } else {
                assert_eq!(insight.value, InsightValue::NoData, "{:?}", insight.kind);
            }
        }
        assert_eq!(Totals::of(&view), Totals::default());
    }
}
