use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column – one named vector of a Dataset
// ---------------------------------------------------------------------------

/// A fixed-length columnar vector. The three cell types cover everything
/// in the CSSE data: case counts and coordinates, region names, dates.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
    Date(Vec<NaiveDate>),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable cell type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Text(_) => "text",
            Column::Date(_) => "date",
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dates(&self) -> Option<&[NaiveDate]> {
        match self {
            Column::Date(v) => Some(v),
            _ => None,
        }
    }

    /// Keep only the rows where `mask` is true, preserving order.
    pub fn select(&self, mask: &Mask) -> Column {
        fn pick<T: Clone>(values: &[T], mask: &Mask) -> Vec<T> {
            debug_assert_eq!(values.len(), mask.len(), "mask misaligned with column");
            values
                .iter()
                .zip(mask.bits())
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            Column::Numeric(v) => Column::Numeric(pick(v, mask)),
            Column::Text(v) => Column::Text(pick(v, mask)),
            Column::Date(v) => Column::Date(pick(v, mask)),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Numeric(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Text(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<NaiveDate>> for Column {
    fn from(v: Vec<NaiveDate>) -> Self {
        Column::Date(v)
    }
}

// ---------------------------------------------------------------------------
// Dataset – parallel named columns sharing one row index
// ---------------------------------------------------------------------------

/// An insertion-ordered mapping from field name to column. Invariant:
/// every column has the same length, checked on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    fields: Vec<(String, Column)>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset { fields: Vec::new() }
    }

    /// Add a column. The first insert fixes the row count; later inserts
    /// must match it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> anyhow::Result<()> {
        let name = name.into();
        let column = column.into();
        if let Some(n) = self.fields.first().map(|(_, c)| c.len()) {
            if column.len() != n {
                anyhow::bail!(
                    "column '{}' has {} rows, dataset has {}",
                    name,
                    column.len(),
                    n
                );
            }
        }
        self.fields.push((name, column));
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, column)| column)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of rows (zero when no column has been inserted yet).
    pub fn len(&self) -> usize {
        self.fields.first().map_or(0, |(_, c)| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply one mask to every column, yielding the sub-dataset of rows
    /// where the mask is true. Relative row order is preserved.
    pub fn select(&self, mask: &Mask) -> Dataset {
        Dataset {
            fields: self
                .fields
                .iter()
                .map(|(name, column)| (name.clone(), column.select(mask)))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mask – a boolean selection vector
// ---------------------------------------------------------------------------

/// A boolean vector aligned to a dataset's row index. True means the row
/// is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask(Vec<bool>);

impl Mask {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Mask(bits)
    }

    /// The identity selection: every one of `n` rows.
    pub fn all_true(n: usize) -> Self {
        Mask(vec![true; n])
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positions of the selected rows, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of selected rows.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|bit| **bit).count()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|bit| *bit)
    }

    /// Select from an arbitrary parallel slice (for callers keeping data
    /// outside a [`Dataset`], e.g. the per-region count matrices).
    pub fn apply<T: Clone>(&self, values: &[T]) -> Vec<T> {
        debug_assert_eq!(values.len(), self.0.len(), "mask misaligned with data");
        values
            .iter()
            .zip(&self.0)
            .filter(|(_, keep)| **keep)
            .map(|(v, _)| v.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert("country", vec!["US", "US", "Italy"]).unwrap();
        ds.insert("confirmed", vec![10.0, 20.0, 30.0]).unwrap();
        ds
    }

    #[test]
    fn insert_enforces_equal_lengths() {
        let mut ds = sample();
        let err = ds.insert("short", vec![1.0]).unwrap_err();
        assert!(err.to_string().contains("1 rows"));
    }

    #[test]
    fn column_lookup_preserves_insertion_order() {
        let ds = sample();
        let names: Vec<&str> = ds.field_names().collect();
        assert_eq!(names, vec!["country", "confirmed"]);
        assert!(ds.column("confirmed").is_some());
        assert!(ds.column("dead").is_none());
    }

    #[test]
    fn mask_indices_and_count() {
        let mask = Mask::from_bits(vec![true, false, true]);
        assert_eq!(mask.indices(), vec![0, 2]);
        assert_eq!(mask.count(), 2);
        assert!(mask.any());
    }

    #[test]
    #[should_panic(expected = "mask misaligned")]
    fn misaligned_mask_is_caught_in_debug_builds() {
        let mask = Mask::from_bits(vec![true, false]);
        Column::from(vec![1.0, 2.0, 3.0]).select(&mask);
    }

    #[test]
    fn select_keeps_row_order_and_lengths() {
        let ds = sample();
        let mask = Mask::from_bits(vec![true, false, true]);
        let sub = ds.select(&mask);
        assert_eq!(sub.len(), 2);
        assert_eq!(
            sub.column("country"),
            Some(&Column::from(vec!["US", "Italy"]))
        );
        assert_eq!(
            sub.column("confirmed"),
            Some(&Column::Numeric(vec![10.0, 30.0]))
        );
    }
}
