/// Query engine: string-driven conditions over parallel columnar vectors.
///
/// Pipeline:
/// ```text
///  parameters / conditions / values / modifiers
///        │
///        ▼
///   ┌───────────┐
///   │  shape     │  broadcast argument shapes → Vec<ConditionTriple>
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  eval      │  per triple: modifier → value → condition → bool row
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  combine   │  AND/OR the T×N rows → one length-N Mask
///   └───────────┘
/// ```
///
/// `registry` holds the token vocabularies (comparisons, statistics,
/// vector modifiers, nearest matches); `searcher` is the facade binding
/// one dataset to the pipeline.

pub mod eval;
pub mod registry;
pub mod searcher;
pub mod shape;

pub use registry::{ApplyTo, Comparison, Condition, Modifier, NearestMatch, Statistic};
pub use searcher::{Query, Searcher};
pub use shape::{ConditionTriple, OneOrMany, Value};
