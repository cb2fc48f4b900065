use chrono::NaiveDate;

use crate::data::model::{Column, Dataset, Mask};
use crate::error::{QueryError, Result};
use crate::query::registry::{ApplyTo, Condition, Statistic};
use crate::query::shape::{ConditionTriple, Value};

// ---------------------------------------------------------------------------
// Per-triple evaluation
// ---------------------------------------------------------------------------

/// Evaluate every triple against the dataset, yielding one boolean row per
/// triple (a T x N matrix in row order = triple order).
pub fn evaluate(dataset: &Dataset, triples: &[ConditionTriple]) -> Result<Vec<Vec<bool>>> {
    triples
        .iter()
        .map(|triple| evaluate_triple(dataset, triple))
        .collect()
}

fn evaluate_triple(dataset: &Dataset, triple: &ConditionTriple) -> Result<Vec<bool>> {
    let column = dataset
        .column(&triple.parameter)
        .ok_or_else(|| QueryError::UnknownField(triple.parameter.clone()))?;

    // A modifier forces the numeric path; text and date fields compare
    // directly on their own cell type.
    let mask = match &triple.modifier {
        Some(modifier) => {
            let data = column.as_numeric().ok_or_else(|| QueryError::TypeMismatch {
                field: triple.parameter.clone(),
                operation: "a vector modifier",
            })?;
            let transformed = modifier.apply(data);
            let mask = numeric_mask(triple, &transformed)?;
            if modifier.shrinks() {
                widen_delta_mask(&mask)
            } else {
                mask
            }
        }
        None => match column {
            Column::Numeric(data) => numeric_mask(triple, data)?,
            Column::Text(data) => text_mask(triple, data)?,
            Column::Date(data) => date_mask(triple, data)?,
        },
    };
    Ok(mask)
}

fn numeric_mask(triple: &ConditionTriple, data: &[f64]) -> Result<Vec<bool>> {
    // The string calling convention puts statistic tokens in the value
    // slot; against a numeric field a text value can only be one of those.
    let value = match &triple.value {
        Value::Number(v) => *v,
        Value::Stat(stat) => stat.reduce(data),
        Value::Text(token) => Statistic::from_token(token)?.reduce(data),
        Value::Date(_) => {
            return Err(QueryError::TypeMismatch {
                field: triple.parameter.clone(),
                operation: "comparison against a date",
            })
        }
    };
    match triple.condition {
        Condition::Compare(cmp) => Ok(cmp.apply(data, &value)),
        Condition::Nearest(near) => near.apply(data, value),
    }
}

fn text_mask(triple: &ConditionTriple, data: &[String]) -> Result<Vec<bool>> {
    let Value::Text(value) = &triple.value else {
        return Err(QueryError::TypeMismatch {
            field: triple.parameter.clone(),
            operation: "comparison against a non-text value",
        });
    };
    match triple.condition {
        Condition::Compare(cmp) => Ok(cmp.apply(data, value)),
        Condition::Nearest(_) => Err(QueryError::TypeMismatch {
            field: triple.parameter.clone(),
            operation: "a nearest match",
        }),
    }
}

fn date_mask(triple: &ConditionTriple, data: &[NaiveDate]) -> Result<Vec<bool>> {
    let Value::Date(value) = &triple.value else {
        return Err(QueryError::TypeMismatch {
            field: triple.parameter.clone(),
            operation: "comparison against a non-date value",
        });
    };
    match triple.condition {
        Condition::Compare(cmp) => Ok(cmp.apply(data, value)),
        // Proximity over dates runs on day offsets from the first entry.
        Condition::Nearest(near) => {
            let origin = data.first().copied().unwrap_or(*value);
            let days: Vec<f64> = data
                .iter()
                .map(|d| (*d - origin).num_days() as f64)
                .collect();
            near.apply(&days, (*value - origin).num_days() as f64)
        }
    }
}

/// Recover an index-level selection from a derivative-level one. A delta
/// mask of length N-1 is indexed over adjacent pairs; a true at i selects
/// both endpoints i and i+1 of that pair.
fn widen_delta_mask(mask: &[bool]) -> Vec<bool> {
    let mut widened = vec![false; mask.len() + 1];
    for (i, hit) in mask.iter().enumerate() {
        if *hit {
            widened[i] = true;
            widened[i + 1] = true;
        }
    }
    widened
}

// ---------------------------------------------------------------------------
// Conjunction reduction
// ---------------------------------------------------------------------------

/// Collapse the T x N matrix to one mask: AND down each column for
/// [`ApplyTo::All`], OR for [`ApplyTo::Any`]. An all-false result is an
/// error, never a silent empty selection.
pub fn combine(rows: &[Vec<bool>], apply_to: ApplyTo) -> Result<Mask> {
    let n = rows.first().map_or(0, Vec::len);
    debug_assert!(
        rows.iter().all(|row| row.len() == n),
        "condition rows differ in length"
    );
    let bits: Vec<bool> = (0..n)
        .map(|i| match apply_to {
            ApplyTo::All => rows.iter().all(|row| row[i]),
            ApplyTo::Any => rows.iter().any(|row| row[i]),
        })
        .collect();

    let mask = Mask::from_bits(bits);
    if !mask.any() {
        return Err(QueryError::EmptySelection);
    }
    Ok(mask)
}
