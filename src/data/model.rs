use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use super::kpi::{self, Kpis};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const COL_PROJECT_NAME: &str = "Project Name";
pub const COL_LOCATION: &str = "Location";
pub const COL_ENERGY_TYPE: &str = "Energy Type";
pub const COL_PROJECT_STATUS: &str = "Project Status";
pub const COL_START_DATE: &str = "Start Date";
pub const COL_END_DATE: &str = "End Date";
pub const COL_INSTALLED_CAPACITY: &str = "Installed Capacity (MW)";
pub const COL_ENERGY_GENERATED: &str = "Energy Generated (MWh)";
pub const COL_REVENUE: &str = "Revenue (USD)";
pub const COL_PROFIT: &str = "Profit (USD)";
pub const COL_OPERATIONAL_COST: &str = "Operational Cost";
pub const COL_CO2_REDUCTION: &str = "CO2 Reduction (tons)";

/// Every column the loader requires, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    COL_PROJECT_NAME,
    COL_LOCATION,
    COL_ENERGY_TYPE,
    COL_PROJECT_STATUS,
    COL_START_DATE,
    COL_END_DATE,
    COL_INSTALLED_CAPACITY,
    COL_ENERGY_GENERATED,
    COL_REVENUE,
    COL_PROFIT,
    COL_OPERATIONAL_COST,
    COL_CO2_REDUCTION,
];

/// Alternative headers accepted for a required column.
pub fn column_aliases(column: &str) -> &'static [&'static str] {
    match column {
        COL_OPERATIONAL_COST => &["Operational Cost (USD)"],
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a project. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Operational,
    UnderConstruction,
    Planned,
    Other(String),
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Operational" => ProjectStatus::Operational,
            "Under Construction" => ProjectStatus::UnderConstruction,
            "Planned" => ProjectStatus::Planned,
            other => ProjectStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ProjectStatus::Operational => "Operational",
            ProjectStatus::UnderConstruction => "Under Construction",
            ProjectStatus::Planned => "Planned",
            ProjectStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ProjectRecord – one row of the spreadsheet
// ---------------------------------------------------------------------------

/// A single project (one row of the source sheet) with its derived KPIs.
///
/// Numeric source fields are `None` when the cell was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub project_name: String,
    pub location: String,
    pub energy_type: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    /// `None` when the sheet holds `-` (still running) or nothing.
    pub end_date: Option<NaiveDate>,
    pub installed_capacity_mw: Option<f64>,
    pub energy_generated_mwh: Option<f64>,
    pub revenue_usd: Option<f64>,
    pub profit_usd: Option<f64>,
    pub operational_cost_usd: Option<f64>,
    pub co2_reduction_tons: Option<f64>,
    /// Filled by [`kpi::derive_all`] when the table is built.
    pub kpis: Kpis,
}

// ---------------------------------------------------------------------------
// ProjectTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full table: rows in source order with KPIs derived once, plus the
/// distinct values offered by the filter controls.
#[derive(Debug, Clone, Default)]
pub struct ProjectTable {
    rows: Vec<ProjectRecord>,
    /// Distinct locations in first-appearance order.
    pub locations: Vec<String>,
    /// Distinct energy types in first-appearance order.
    pub energy_types: Vec<String>,
    /// Distinct project names in first-appearance order.
    pub project_names: Vec<String>,
    /// Number of KPI cells left undefined by derivation.
    pub undefined_kpis: usize,
}

impl ProjectTable {
    /// Derive KPIs over all rows and build the filter option lists.
    pub fn new(mut rows: Vec<ProjectRecord>) -> Self {
        let undefined_kpis = kpi::derive_all(&mut rows);
        let locations = distinct(rows.iter().map(|r| r.location.as_str()));
        let energy_types = distinct(rows.iter().map(|r| r.energy_type.as_str()));
        let project_names = distinct(rows.iter().map(|r| r.project_name.as_str()));
        ProjectTable {
            rows,
            locations,
            energy_types,
            project_names,
            undefined_kpis,
        }
    }

    pub fn row(&self, idx: usize) -> &ProjectRecord {
        &self.rows[idx]
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn table_keeps_first_appearance_order_of_options() {
        let table = ProjectTable::new(vec![
            record("B", "North", "Wind"),
            record("A", "South", "Solar"),
            record("B", "North", "Hydro"),
        ]);
        assert_eq!(table.locations, vec!["North", "South"]);
        assert_eq!(table.energy_types, vec!["Wind", "Solar", "Hydro"]);
        assert_eq!(table.project_names, vec!["B", "A"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn table_derives_kpis_on_construction() {
        let table = ProjectTable::new(vec![record("A", "North", "Solar")]);
        assert_eq!(table.row(0).kpis.efficiency_usd_per_mwh, Some(2.0));
        assert_eq!(table.undefined_kpis, 0);
    }

    #[test]
    fn status_round_trips_known_and_unknown_labels() {
        assert_eq!(
            ProjectStatus::parse(" Under Construction "),
            ProjectStatus::UnderConstruction
        );
        let other = ProjectStatus::parse("Decommissioned");
        assert_eq!(other, ProjectStatus::Other("Decommissioned".into()));
        assert_eq!(other.to_string(), "Decommissioned");
    }
}
