/// Data layer: core types, loading, and geocoding.
///
/// Architecture:
/// ```text
///  Confirmed.csv / Deaths.csv / Recovered.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + key-join align the three tables
///   └──────────┘
///        │                ┌──────┐
///        │◄───────────────│ geo  │  province/county split
///        ▼                └──────┘
///   ┌──────────────┐
///   │ CaseDatabase  │  regions Dataset + region×date count matrices
///   └──────────────┘
///        │
///        ▼
///   per-region / region-metadata Datasets, queried via query::Searcher
/// ```

pub mod database;
pub mod geo;
pub mod loader;
pub mod model;

pub use database::CaseDatabase;
pub use model::{Column, Dataset, Mask};
