//! Condition-driven search over COVID-19 case time series.
//!
//! The heart of the crate is [`query`]: a string-token condition engine
//! that filters parallel columnar vectors with boolean masks. Callers
//! describe filters like "confirmed greater than mean" or "date nearest
//! forward to 2020-03-01" as (parameters, conditions, values, modifiers)
//! in whatever scalar/sequence shapes are convenient; the engine
//! broadcasts them into per-field conditions, evaluates each one, and
//! combines the results with AND/OR semantics.
//!
//! [`data`] supplies the inputs: the columnar [`data::Dataset`] model,
//! the CSSE CSV loader, and the [`data::CaseDatabase`] wrapper that keeps
//! region metadata and the three count matrices on one shared row index.
//!
//! ```no_run
//! use caseload::data::CaseDatabase;
//! use caseload::query::{Comparison, Condition, Query, Value};
//!
//! fn main() -> anyhow::Result<()> {
//!     let db = CaseDatabase::load(std::path::Path::new("Data"))?;
//!     let italy = db.select_regions(&Query::filter(
//!         "country",
//!         Condition::Compare(Comparison::Eq),
//!         Value::from("Italy"),
//!     ))?;
//!     println!("{} matching regions", italy.num_regions());
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod query;

pub use data::{CaseDatabase, Column, Dataset, Mask};
pub use error::QueryError;
pub use query::{Query, Searcher};
