mod app;
mod color;
mod data;
mod format;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::DashboardApp;
use eframe::egui;
use state::AppState;

/// Read when no path is given on the command line.
const DEFAULT_DATA_PATH: &str = "renewable_projects.xlsx";

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    // The dashboard cannot render without data, so a load failure ends startup.
    let state = AppState::load(&path).inspect_err(|e| log::error!("{e:#}"))?;
    if state.table.is_empty() {
        log::warn!("{} contains no project rows", path.display());
    }
    log::info!(
        "{} projects ready, {} undefined KPI value(s)",
        state.table.len(),
        state.table.undefined_kpis
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Renewable Energy Projects Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
