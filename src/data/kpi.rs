use super::model::ProjectRecord;

// ---------------------------------------------------------------------------
// Derived financial KPIs
// ---------------------------------------------------------------------------

/// The five ratios derived from each project row.
///
/// `None` means undefined: a missing operand, a zero divisor, or a
/// non-finite result. It is displayed as `NaN` and skipped by charts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    /// Profit / Energy Generated (MWh)
    pub efficiency_usd_per_mwh: Option<f64>,
    /// (Profit / Revenue) * 100
    pub gross_margin_pct: Option<f64>,
    /// Operational Cost / Energy Generated (MWh)
    pub cost_efficiency_usd_per_mwh: Option<f64>,
    /// (Profit / Operational Cost) * 100
    pub roi_pct: Option<f64>,
    /// Revenue / Energy Generated (MWh)
    pub revenue_per_mwh_usd: Option<f64>,
}

impl Kpis {
    pub fn derive(r: &ProjectRecord) -> Self {
        let energy = r.energy_generated_mwh;
        Kpis {
            efficiency_usd_per_mwh: ratio(r.profit_usd, energy),
            gross_margin_pct: ratio(r.profit_usd, r.revenue_usd).map(|v| v * 100.0),
            cost_efficiency_usd_per_mwh: ratio(r.operational_cost_usd, energy),
            roi_pct: ratio(r.profit_usd, r.operational_cost_usd).map(|v| v * 100.0),
            revenue_per_mwh_usd: ratio(r.revenue_usd, energy),
        }
    }

    /// Number of undefined ratios.
    pub fn undefined_count(&self) -> usize {
        [
            self.efficiency_usd_per_mwh,
            self.gross_margin_pct,
            self.cost_efficiency_usd_per_mwh,
            self.roi_pct,
            self.revenue_per_mwh_usd,
        ]
        .iter()
        .filter(|v| v.is_none())
        .count()
    }
}

fn ratio(numerator: Option<f64>, divisor: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, divisor?);
    if d == 0.0 {
        return None;
    }
    let v = n / d;
    v.is_finite().then_some(v)
}

/// Compute KPIs for every row in place. Returns the number of undefined cells.
pub fn derive_all(rows: &mut [ProjectRecord]) -> usize {
    let mut undefined = 0usize;
    let mut affected_rows = 0usize;
    for r in rows.iter_mut() {
        r.kpis = Kpis::derive(r);
        let n = r.kpis.undefined_count();
        if n > 0 {
            log::debug!("{}: {n} KPI(s) undefined", r.project_name);
            undefined += n;
            affected_rows += 1;
        }
    }
    if undefined > 0 {
        log::warn!(
            "{undefined} KPI value(s) undefined across {affected_rows} project(s) (zero or missing divisor)"
        );
    }
    undefined
}
