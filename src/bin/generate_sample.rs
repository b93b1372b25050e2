use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// One row of the sample sheet, headers as the dashboard expects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SampleRow {
    #[serde(rename = "Project Name")]
    project_name: String,
    #[serde(rename = "Location")]
    location: &'static str,
    #[serde(rename = "Energy Type")]
    energy_type: &'static str,
    #[serde(rename = "Project Status")]
    status: &'static str,
    #[serde(rename = "Start Date")]
    start_date: String,
    #[serde(rename = "End Date")]
    end_date: String,
    #[serde(rename = "Installed Capacity (MW)")]
    capacity_mw: f64,
    #[serde(rename = "Energy Generated (MWh)")]
    energy_mwh: f64,
    #[serde(rename = "Revenue (USD)")]
    revenue_usd: f64,
    #[serde(rename = "Profit (USD)")]
    profit_usd: f64,
    #[serde(rename = "Operational Cost")]
    operational_cost_usd: f64,
    #[serde(rename = "CO2 Reduction (tons)")]
    co2_tons: f64,
}

/// Deterministic splitmix64 stream, so every run writes the same sheet.
struct SampleRng(u64);

impl SampleRng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next() % items.len() as u64) as usize]
    }
}

const LOCATIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];

/// (energy type, capacity factor, tons of CO2 avoided per MWh, price per MWh)
const TECHNOLOGIES: [(&str, f64, f64, f64); 4] = [
    ("Solar", 0.20, 0.45, 48.0),
    ("Wind", 0.35, 0.50, 52.0),
    ("Hydro", 0.45, 0.40, 45.0),
    ("Biomass", 0.70, 0.25, 60.0),
];

const NAMES: [&str; 6] = ["Ridge", "Valley", "Harbor", "Mesa", "Delta", "Summit"];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn sample_rows(seed: u64) -> Result<Vec<SampleRow>> {
    let mut rng = SampleRng(seed);
    let epoch = NaiveDate::from_ymd_opt(2015, 1, 1).context("invalid epoch date")?;
    let mut rows = Vec::new();

    for (i, name) in NAMES.iter().enumerate() {
        for (tech, capacity_factor, co2_per_mwh, price) in TECHNOLOGIES {
            let status = match (i + rows.len()) % 5 {
                0 | 1 | 2 => "Operational",
                3 => "Under Construction",
                _ => "Planned",
            };
            let capacity_mw = (rng.range(10.0, 400.0)).round();
            let start = epoch + Duration::days(rng.range(0.0, 3000.0) as i64);

            // Only operating plants produce; the rest report zeros, which leave
            // the per-MWh KPIs undefined.
            let (energy_mwh, revenue_usd, operational_cost_usd, end_date) = match status {
                "Operational" => {
                    let energy = (capacity_mw * 8760.0 * capacity_factor * rng.range(0.8, 1.1)).round();
                    let revenue = round2(energy * price * rng.range(0.9, 1.2));
                    let cost = round2(revenue * rng.range(0.45, 0.9));
                    let end = start + Duration::days(365 * 25);
                    (energy, revenue, cost, end.format("%Y-%m-%d").to_string())
                }
                "Under Construction" => (0.0, 0.0, round2(rng.range(1e5, 5e5)), "-".to_string()),
                _ => (0.0, 0.0, 0.0, "-".to_string()),
            };

            rows.push(SampleRow {
                project_name: format!("{} {tech} {}", rng.pick(&LOCATIONS), name),
                location: rng.pick(&LOCATIONS),
                energy_type: tech,
                status,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date,
                capacity_mw,
                energy_mwh,
                revenue_usd,
                profit_usd: round2(revenue_usd - operational_cost_usd),
                operational_cost_usd,
                co2_tons: (energy_mwh * co2_per_mwh).round(),
            });
        }
    }
    Ok(rows)
}

fn main() -> Result<()> {
    let rows = sample_rows(42)?;

    let output_path = "renewable_projects.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Wrote {} projects to {output_path}", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_writes_same_rows() {
        assert_eq!(sample_rows(7).unwrap(), sample_rows(7).unwrap());
        assert_ne!(sample_rows(7).unwrap(), sample_rows(8).unwrap());
    }

    #[test]
    fn idle_projects_have_hyphen_end_date_and_no_output() {
        let rows = sample_rows(42).unwrap();
        assert_eq!(rows.len(), NAMES.len() * TECHNOLOGIES.len());
        for r in &rows {
            if r.status == "Operational" {
                assert_ne!(r.end_date, "-");
                assert!(r.energy_mwh > 0.0);
            } else {
                assert_eq!(r.end_date, "-");
                assert_eq!(r.energy_mwh, 0.0);
            }
        }
        assert!(rows.iter().any(|r| r.status == "Planned" && r.operational_cost_usd == 0.0));
    }
}
