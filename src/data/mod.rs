//! Data layer: core types, loading, KPI derivation, filtering and insights.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<ProjectRecord>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ ProjectTable  │  rows + KPIs (derived once), filter options
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply selections → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ insights  │  totals, max-by-group, max-by-row, sentences
//!   └──────────┘
//! ```

pub mod error;
pub mod filter;
pub mod insights;
pub mod kpi;
pub mod loader;
pub mod measure;
pub mod model;
