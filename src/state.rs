use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::filter::{FilterDimension, FilterSelection, FilteredView};
use crate::data::loader;
use crate::data::model::ProjectTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page the sidebar navigation is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    KeyInsights,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Dashboard, Page::KeyInsights];

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::KeyInsights => "Key Insights",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table with KPIs derived. Never mutated after load.
    pub table: ProjectTable,

    /// File the table was loaded from.
    pub source: PathBuf,

    /// Sidebar filter selections.
    pub filters: FilterSelection,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Current page.
    pub page: Page,

    /// Colour per energy type.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: ProjectTable, source: PathBuf) -> Self {
        let mut state = AppState {
            table: ProjectTable::default(),
            source: PathBuf::new(),
            filters: FilterSelection::default(),
            visible_indices: Vec::new(),
            page: Page::default(),
            color_map: ColorMap::default(),
            status_message: None,
        };
        state.set_table(table, source);
        state
    }

    /// Load and derive a table from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let records = loader::load_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        Ok(AppState::new(ProjectTable::new(records), path.to_path_buf()))
    }

    /// Ingest a newly loaded table, resetting filters and colours.
    pub fn set_table(&mut self, table: ProjectTable, source: PathBuf) {
        self.color_map = ColorMap::new(&table.energy_types);
        self.filters = FilterSelection::default();
        self.visible_indices = (0..table.len()).collect();
        self.table = table;
        self.source = source;
        self.status_message = None;
    }

    /// Replace the table with the contents of `path`; on failure keep the
    /// current table and surface the error.
    pub fn reload_from(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(records) => {
                let table = ProjectTable::new(records);
                log::info!(
                    "Loaded {} projects ({} undefined KPI values)",
                    table.len(),
                    table.undefined_kpis
                );
                self.set_table(table, path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// The rows currently selected.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.table, &self.visible_indices)
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = FilteredView::new(&self.table, &self.filters)
            .indices()
            .to_vec();
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dim: FilterDimension, value: &str) {
        self.filters.toggle(dim, value);
        self.refilter();
    }

    /// Remove every selection for a dimension.
    pub fn clear_filter(&mut self, dim: FilterDimension) {
        self.filters.clear(dim);
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::record;

    fn state() -> AppState {
        let table = ProjectTable::new(vec![
            record("Sunfield", "North", "Solar"),
            record("Gale Ridge", "South", "Wind"),
        ]);
        AppState::new(table, PathBuf::from("projects.csv"))
    }

    #[test]
    fn starts_on_dashboard_with_everything_visible() {
        let s = state();
        assert_eq!(s.page, Page::Dashboard);
        assert_eq!(s.visible_indices, vec![0, 1]);
    }

    #[test]
    fn toggling_filters_updates_visible_rows() {
        let mut s = state();
        s.toggle_filter_value(FilterDimension::Region, "South");
        assert_eq!(s.visible_indices, vec![1]);
        assert_eq!(s.view().iter().next().unwrap().project_name, "Gale Ridge");

        s.clear_filter(FilterDimension::Region);
        assert_eq!(s.view().len(), 2);
    }

    #[test]
    fn failed_reload_keeps_current_table() {
        let mut s = state();
        s.reload_from(Path::new("missing/renewable_projects.xlsx"));
        assert_eq!(s.table.len(), 2);
        assert!(s.status_message.as_deref().unwrap().starts_with("Error"));
    }
}
