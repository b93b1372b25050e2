use super::model::{self, ProjectRecord};

/// A numeric column of the table, source or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    InstalledCapacity,
    EnergyGenerated,
    Revenue,
    Profit,
    OperationalCost,
    Co2Reduction,
    Efficiency,
    GrossMargin,
    CostEfficiency,
    Roi,
    RevenuePerMwh,
}

impl Measure {
    pub fn value(self, r: &ProjectRecord) -> Option<f64> {
        match self {
            Measure::InstalledCapacity => r.installed_capacity_mw,
            Measure::EnergyGenerated => r.energy_generated_mwh,
            Measure::Revenue => r.revenue_usd,
            Measure::Profit => r.profit_usd,
            Measure::OperationalCost => r.operational_cost_usd,
            Measure::Co2Reduction => r.co2_reduction_tons,
            Measure::Efficiency => r.kpis.efficiency_usd_per_mwh,
            Measure::GrossMargin => r.kpis.gross_margin_pct,
            Measure::CostEfficiency => r.kpis.cost_efficiency_usd_per_mwh,
            Measure::Roi => r.kpis.roi_pct,
            Measure::RevenuePerMwh => r.kpis.revenue_per_mwh_usd,
        }
    }

    /// Column header, matching the source sheet for source columns.
    pub fn label(self) -> &'static str {
        match self {
            Measure::InstalledCapacity => model::COL_INSTALLED_CAPACITY,
            Measure::EnergyGenerated => model::COL_ENERGY_GENERATED,
            Measure::Revenue => model::COL_REVENUE,
            Measure::Profit => model::COL_PROFIT,
            Measure::OperationalCost => model::COL_OPERATIONAL_COST,
            Measure::Co2Reduction => model::COL_CO2_REDUCTION,
            Measure::Efficiency => "Efficiency (USD/MWh)",
            Measure::GrossMargin => "Gross Margin (%)",
            Measure::CostEfficiency => "Cost Efficiency (USD/MWh)",
            Measure::Roi => "ROI (%)",
            Measure::RevenuePerMwh => "Revenue per MWh (USD)",
        }
    }
}
