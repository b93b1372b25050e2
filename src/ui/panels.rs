use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FilterDimension;
use crate::format::format_int;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// A change requested from the sidebar, applied once the widgets are drawn.
enum FilterAction {
    Toggle(FilterDimension, String),
    Clear(FilterDimension),
}

/// Render the left panel: page selector and the three multi-select filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.label("Go to");
    for page in Page::ALL {
        ui.radio_value(&mut state.page, page, page.label());
    }
    ui.separator();

    ui.heading("Filters");
    let mut actions: Vec<FilterAction> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in FilterDimension::ALL {
                let options = dim.options(&state.table);
                let selected = state.filters.get(dim);

                // Show count of selected / total in the header
                let header_text = if selected.is_empty() {
                    format!("{}  (all)", dim.label())
                } else {
                    format!("{}  ({}/{})", dim.label(), selected.len(), options.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(dim != FilterDimension::Project)
                    .show(ui, |ui: &mut Ui| {
                        if ui
                            .add_enabled(!selected.is_empty(), egui::Button::new("Clear").small())
                            .clicked()
                        {
                            actions.push(FilterAction::Clear(dim));
                        }

                        for value in options {
                            let mut checked = selected.contains(value);
                            let mut text = RichText::new(value);
                            if dim == FilterDimension::EnergyType {
                                text = text.color(state.color_map.color_for(value));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                actions.push(FilterAction::Toggle(dim, value.clone()));
                            }
                        }
                    });
            }
        });

    // Apply after drawing so the option lists are not borrowed while mutating.
    for action in actions {
        match action {
            FilterAction::Toggle(dim, value) => state.toggle_filter_value(dim, &value),
            FilterAction::Clear(dim) => state.clear_filter(dim),
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} projects loaded, {} visible",
            format_int(state.table.len()),
            format_int(state.visible_indices.len())
        ));
        if let Some(name) = state.source.file_name() {
            ui.label(RichText::new(name.to_string_lossy()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open project data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.reload_from(&path);
    }
}
