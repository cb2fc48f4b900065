use chrono::NaiveDate;

use crate::error::{QueryError, Result};
use crate::query::registry::{Condition, Modifier, Statistic};

// ---------------------------------------------------------------------------
// Argument shapes
// ---------------------------------------------------------------------------

/// One query argument: a single scalar or a sequence. Callers hand in
/// whichever shape is natural; [`normalize`] broadcasts the scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Number of entries a sequence carries; `None` for a scalar.
    fn seq_len(&self) -> Option<usize> {
        match self {
            OneOrMany::One(_) => None,
            OneOrMany::Many(items) => Some(items.len()),
        }
    }
}

impl<T: Clone> OneOrMany<T> {
    /// Expand to exactly `n` entries: scalars replicate, sequences must
    /// already have length `n` (checked by the caller).
    fn broadcast(&self, n: usize) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item.clone(); n],
            OneOrMany::Many(items) => items.clone(),
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        OneOrMany::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(item: &str) -> Self {
        OneOrMany::One(item.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(items: Vec<&str>) -> Self {
        OneOrMany::Many(items.into_iter().map(str::to_string).collect())
    }
}

// ---------------------------------------------------------------------------
// Value – the right-hand side of a condition
// ---------------------------------------------------------------------------

/// A comparison target: a literal, or a statistic resolved against the
/// (possibly modifier-transformed) field at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Stat(Statistic),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<Statistic> for Value {
    fn from(v: Statistic) -> Self {
        Value::Stat(v)
    }
}

// ---------------------------------------------------------------------------
// ConditionTriple – one normalized unit of a query
// ---------------------------------------------------------------------------

/// (field, condition, value, optional modifier). Only [`normalize`]
/// produces these; they live for one query evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTriple {
    pub parameter: String,
    pub condition: Condition,
    pub value: Value,
    pub modifier: Option<Modifier>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn shape_mismatch(
    left_count: usize,
    left: &'static str,
    right_count: usize,
    right: &'static str,
) -> QueryError {
    QueryError::ShapeMismatch {
        left_count,
        left,
        right_count,
        right,
    }
}

/// Reconcile the four argument shapes into parallel sequences of equal
/// length and zip them into triples.
///
/// With a single parameter, the broadcast width comes from whichever of
/// conditions/values is a sequence (both sequences must agree). With a
/// parameter sequence of length P, everything broadcasts to P; a scalar
/// value replicates to P even when the conditions are a sequence.
pub fn normalize(
    parameters: &OneOrMany<String>,
    conditions: &OneOrMany<Condition>,
    values: &OneOrMany<Value>,
    modifiers: Option<&OneOrMany<Modifier>>,
) -> Result<Vec<ConditionTriple>> {
    let width = match parameters {
        OneOrMany::One(_) => {
            match (conditions.seq_len(), values.seq_len()) {
                (None, None) => 1,
                (None, Some(m)) => m,
                (Some(k), None) => k,
                (Some(k), Some(m)) => {
                    if k != m {
                        return Err(shape_mismatch(k, "conditions", m, "values"));
                    }
                    k
                }
            }
        }
        OneOrMany::Many(params) => {
            let p = params.len();
            if let Some(k) = conditions.seq_len() {
                if k != p {
                    return Err(shape_mismatch(p, "parameters", k, "conditions"));
                }
            }
            if let Some(m) = values.seq_len() {
                if m != p {
                    return Err(shape_mismatch(p, "parameters", m, "values"));
                }
            }
            p
        }
    };

    let modifiers = match modifiers {
        None => vec![None; width],
        Some(shape) => {
            if let Some(l) = shape.seq_len() {
                if l != width {
                    return Err(shape_mismatch(l, "modifiers", width, "parameters"));
                }
            }
            shape.broadcast(width).into_iter().map(Some).collect()
        }
    };

    let parameters = parameters.broadcast(width);
    let conditions = conditions.broadcast(width);
    let values = values.broadcast(width);

    Ok(parameters
        .into_iter()
        .zip(conditions)
        .zip(values)
        .zip(modifiers)
        .map(|(((parameter, condition), value), modifier)| ConditionTriple {
            parameter,
            condition,
            value,
            modifier,
        })
        .collect())
}
