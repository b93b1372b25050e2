use eframe::egui::{RichText, Ui};

use crate::data::insights::{key_insights, KPI_DEFINITIONS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Key Insights page
// ---------------------------------------------------------------------------

/// KPI formulas followed by the nine insight sentences for the current selection.
pub fn show(ui: &mut Ui, state: &AppState) {
    let view = state.view();

    ui.heading("Key Insights");
    ui.add_space(8.0);

    ui.label(RichText::new("1. Overview of KPIs and Calculations").size(18.0).strong());
    for def in &KPI_DEFINITIONS {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label(RichText::new(def.name).strong());
            ui.label(def.description);
        });
        ui.indent(def.name, |ui: &mut Ui| {
            ui.label(RichText::new(format!("Formula: {}", def.formula)).monospace());
        });
    }

    ui.add_space(12.0);
    ui.label(RichText::new("2. Key Insights from the Data").size(18.0).strong());
    for insight in key_insights(&view) {
        ui.add_space(4.0);
        ui.label(RichText::new(format!("{}:", insight.kind.title())).strong());
        let text = RichText::new(format!("- {}", insight.value));
        ui.label(if insight.has_data() { text } else { text.italics().weak() });
    }
}
