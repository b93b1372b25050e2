use std::collections::BTreeSet;

use super::model::{ProjectRecord, ProjectTable};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The three sidebar filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Region,
    EnergyType,
    Project,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 3] = [
        FilterDimension::Region,
        FilterDimension::EnergyType,
        FilterDimension::Project,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Region => "Select Region",
            FilterDimension::EnergyType => "Select Energy Type",
            FilterDimension::Project => "Select Project",
        }
    }

    /// The record field this dimension filters on.
    pub fn value_of(self, record: &ProjectRecord) -> &str {
        match self {
            FilterDimension::Region => &record.location,
            FilterDimension::EnergyType => &record.energy_type,
            FilterDimension::Project => &record.project_name,
        }
    }

    /// Options offered for this dimension, in first-appearance order.
    pub fn options(self, table: &ProjectTable) -> &[String] {
        match self {
            FilterDimension::Region => &table.locations,
            FilterDimension::EnergyType => &table.energy_types,
            FilterDimension::Project => &table.project_names,
        }
    }
}

/// Selected values per dimension. An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub locations: BTreeSet<String>,
    pub energy_types: BTreeSet<String>,
    pub project_names: BTreeSet<String>,
}

impl FilterSelection {
    pub fn get(&self, dim: FilterDimension) -> &BTreeSet<String> {
        match dim {
            FilterDimension::Region => &self.locations,
            FilterDimension::EnergyType => &self.energy_types,
            FilterDimension::Project => &self.project_names,
        }
    }

    pub fn get_mut(&mut self, dim: FilterDimension) -> &mut BTreeSet<String> {
        match dim {
            FilterDimension::Region => &mut self.locations,
            FilterDimension::EnergyType => &mut self.energy_types,
            FilterDimension::Project => &mut self.project_names,
        }
    }

    /// Add `value` to the dimension's selection, or remove it if present.
    pub fn toggle(&mut self, dim: FilterDimension, value: &str) {
        let selected = self.get_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Drop every selection for one dimension.
    pub fn clear(&mut self, dim: FilterDimension) {
        self.get_mut(dim).clear();
    }

    /// True when no dimension restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        FilterDimension::ALL.iter().all(|d| self.get(*d).is_empty())
    }

    /// A record passes when, for each non-empty dimension, its value is selected.
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        FilterDimension::ALL.iter().all(|&dim| {
            let selected = self.get(dim);
            selected.is_empty() || selected.contains(dim.value_of(record))
        })
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows that pass the current selection
// ---------------------------------------------------------------------------

/// Row indices of a [`ProjectTable`] that pass a selection, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a ProjectTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row of the table.
    pub fn all(table: &'a ProjectTable) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Apply `selection` to the full table.
    pub fn new(table: &'a ProjectTable, selection: &FilterSelection) -> Self {
        FilteredView::all(table).refine(selection)
    }

    /// Build a view from indices computed earlier (e.g. cached in app state).
    pub fn from_indices(table: &'a ProjectTable, indices: &[usize]) -> Self {
        FilteredView {
            table,
            indices: indices.iter().copied().filter(|&i| i < table.len()).collect(),
        }
    }

    /// Narrow this view further by `selection`.
    pub fn refine(&self, selection: &FilterSelection) -> Self {
        let indices = if selection.is_unrestricted() {
            self.indices.clone()
        } else {
            self.indices
                .iter()
                .copied()
                .filter(|&i| selection.matches(self.table.row(i)))
                .collect()
        };
        FilteredView {
            table: self.table,
            indices,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Selected rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &'a ProjectRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| table.row(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
