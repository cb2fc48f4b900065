use crate::data::model::{Dataset, Mask};
use crate::error::Result;
use crate::query::eval::{combine, evaluate};
use crate::query::registry::{ApplyTo, Condition, Modifier};
use crate::query::shape::{normalize, OneOrMany, Value};

// ---------------------------------------------------------------------------
// Query – what the caller asks for
// ---------------------------------------------------------------------------

/// A search request. `Everything` is the no-filter shortcut; `Filter`
/// carries the four argument shapes plus the conjunction mode. A filter
/// with conditions but no parameters is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Everything,
    Filter {
        parameters: OneOrMany<String>,
        conditions: OneOrMany<Condition>,
        values: OneOrMany<Value>,
        modifiers: Option<OneOrMany<Modifier>>,
        apply_to: ApplyTo,
    },
}

impl Query {
    /// Select every record.
    pub fn everything() -> Self {
        Query::Everything
    }

    /// A filter combining its conditions with AND and no modifiers; both
    /// can be changed with [`Query::modifiers`] and [`Query::apply_to`].
    pub fn filter(
        parameters: impl Into<OneOrMany<String>>,
        conditions: impl Into<OneOrMany<Condition>>,
        values: impl Into<OneOrMany<Value>>,
    ) -> Self {
        Query::Filter {
            parameters: parameters.into(),
            conditions: conditions.into(),
            values: values.into(),
            modifiers: None,
            apply_to: ApplyTo::All,
        }
    }

    pub fn modifiers(mut self, modifiers: impl Into<OneOrMany<Modifier>>) -> Self {
        if let Query::Filter {
            modifiers: slot, ..
        } = &mut self
        {
            *slot = Some(modifiers.into());
        }
        self
    }

    pub fn apply_to(mut self, mode: ApplyTo) -> Self {
        if let Query::Filter { apply_to, .. } = &mut self {
            *apply_to = mode;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Searcher – one dataset, many independent queries
// ---------------------------------------------------------------------------

/// Binds a dataset for querying. Holds only a shared borrow, so the same
/// dataset can back any number of searchers and concurrent queries.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    dataset: &'a Dataset,
}

impl<'a> Searcher<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Searcher { dataset }
    }

    /// Run a query, producing the selection mask.
    ///
    /// `Query::Everything` short-circuits to the all-true mask without
    /// touching the normalizer or evaluator; a filter runs
    /// normalize -> evaluate -> combine and fails fast on the first
    /// shape, token, field, or empty-selection problem.
    pub fn search(&self, query: &Query) -> Result<Mask> {
        match query {
            Query::Everything => Ok(Mask::all_true(self.dataset.len())),
            Query::Filter {
                parameters,
                conditions,
                values,
                modifiers,
                apply_to,
            } => {
                let triples =
                    normalize(parameters, conditions, values, modifiers.as_ref())?;
                let rows = evaluate(self.dataset, &triples)?;
                combine(&rows, *apply_to)
            }
        }
    }

    /// Like [`Searcher::search`], but as row positions. The no-filter
    /// query yields the identity sequence 0..N-1.
    pub fn search_indices(&self, query: &Query) -> Result<Vec<usize>> {
        Ok(self.search(query)?.indices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::query::registry::Comparison;

    fn dataset() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert("country", vec!["US", "US", "Italy", "Spain", "Spain"])
            .unwrap();
        ds.insert("confirmed", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        ds.insert("dead", vec![0.0, 1.0, 0.0, 2.0, 3.0]).unwrap();
        ds
    }

    fn gt(value: f64) -> Query {
        Query::filter(
            "confirmed",
            Condition::Compare(Comparison::Gt),
            Value::Number(value),
        )
    }

    #[test]
    fn no_filter_returns_identity_indices() {
        let ds = dataset();
        let searcher = Searcher::new(&ds);
        let indices = searcher.search_indices(&Query::everything()).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn simple_comparison_query() {
        let ds = dataset();
        let mask = Searcher::new(&ds).search(&gt(3.0)).unwrap();
        assert_eq!(mask.bits(), &[false, false, false, true, true]);
    }

    #[test]
    fn all_mode_intersects_two_fields() {
        let ds = dataset();
        let query = Query::filter(
            vec!["confirmed", "dead"],
            Condition::Compare(Comparison::Gt),
            Value::Number(1.0),
        );
        let mask = Searcher::new(&ds).search(&query).unwrap();
        assert_eq!(mask.bits(), &[false, false, false, true, true]);
    }

    #[test]
    fn any_mode_unions_two_fields() {
        let ds = dataset();
        let query = Query::filter(
            vec!["confirmed", "dead"],
            Condition::Compare(Comparison::Gt),
            Value::Number(2.0),
        )
        .apply_to(ApplyTo::Any);
        let mask = Searcher::new(&ds).search(&query).unwrap();
        assert_eq!(mask.bits(), &[false, false, true, true, true]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let ds = dataset();
        let err = Searcher::new(&ds).search(&gt(100.0)).unwrap_err();
        assert_eq!(err, QueryError::EmptySelection);
    }

    #[test]
    fn one_mask_filters_parallel_datasets_consistently() {
        let ds = dataset();
        let mask = Searcher::new(&ds).search(&gt(3.0)).unwrap();
        let sub = ds.select(&mask);
        assert_eq!(sub.len(), mask.count());
        // A co-indexed vector outside the dataset gets the same rows.
        let labels = ["a", "b", "c", "d", "e"];
        assert_eq!(mask.apply(&labels), vec!["d", "e"]);
    }
}
