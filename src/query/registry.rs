use crate::error::{QueryError, Result};

// ---------------------------------------------------------------------------
// Token registries
// ---------------------------------------------------------------------------
//
// Each family of query tokens is a closed enum with one `from_token`
// boundary. Tokens are matched exactly and case-sensitively; the alias
// spellings (e.g. both `less than` and `lesser than`) are part of the
// caller contract and must all keep working.

/// Binary comparison, applied elementwise: vector x scalar -> boolean vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "equal" | "equality" | "exact match" => Ok(Comparison::Eq),
            "not equal" => Ok(Comparison::Ne),
            "greater than" => Ok(Comparison::Gt),
            "greater than or equal" => Ok(Comparison::Ge),
            "less than" | "lesser than" => Ok(Comparison::Lt),
            "less than or equal" | "lesser than or equal" => Ok(Comparison::Le),
            _ => Err(QueryError::UnknownToken {
                slot: "condition",
                token: token.to_string(),
            }),
        }
    }

    /// Apply to a single ordered pair. Works for any `PartialOrd` cell
    /// type (f64, &str, NaiveDate).
    pub fn compare<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
        }
    }

    /// Elementwise application against one scalar.
    pub fn apply<T: PartialOrd>(self, data: &[T], value: &T) -> Vec<bool> {
        data.iter().map(|cell| self.compare(cell, value)).collect()
    }
}

// ---------------------------------------------------------------------------

/// Vector -> scalar aggregate, usable in the value slot of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Median,
    /// Population standard deviation.
    StandardDeviation,
    /// Standard error of the mean (sample standard deviation / sqrt n).
    StandardError,
}

impl Statistic {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            "standard deviation" => Ok(Statistic::StandardDeviation),
            "standard error" => Ok(Statistic::StandardError),
            _ => Err(QueryError::UnknownToken {
                slot: "statistical value",
                token: token.to_string(),
            }),
        }
    }

    pub fn reduce(self, data: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(data),
            Statistic::Median => median(data),
            Statistic::StandardDeviation => std_deviation(data, 0),
            Statistic::StandardError => {
                std_deviation(data, 1) / (data.len() as f64).sqrt()
            }
        }
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// `ddof` = 0 gives the population form, 1 the sample form.
fn std_deviation(data: &[f64], ddof: usize) -> f64 {
    let m = mean(data);
    let sum_sq: f64 = data.iter().map(|x| (x - m) * (x - m)).sum();
    (sum_sq / (data.len() - ddof) as f64).sqrt()
}

// ---------------------------------------------------------------------------

/// Vector -> vector transform applied to a field before comparison.
/// The delta family shrinks the vector by one; the evaluator widens the
/// resulting mask back to full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Delta,
    AbsoluteDelta,
    CumulativeSum,
    AbsoluteCumulativeSum,
}

impl Modifier {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "delta" => Ok(Modifier::Delta),
            "absolute delta" => Ok(Modifier::AbsoluteDelta),
            "cumulative sum" => Ok(Modifier::CumulativeSum),
            "absolute cumulative sum" => Ok(Modifier::AbsoluteCumulativeSum),
            _ => Err(QueryError::UnknownToken {
                slot: "modifier",
                token: token.to_string(),
            }),
        }
    }

    /// Whether the transform output is one element shorter than its input.
    pub fn shrinks(self) -> bool {
        matches!(self, Modifier::Delta | Modifier::AbsoluteDelta)
    }

    pub fn apply(self, data: &[f64]) -> Vec<f64> {
        match self {
            Modifier::Delta => diff(data),
            Modifier::AbsoluteDelta => diff(data).into_iter().map(f64::abs).collect(),
            Modifier::CumulativeSum => cumsum(data.iter().copied()),
            Modifier::AbsoluteCumulativeSum => cumsum(data.iter().map(|x| x.abs())),
        }
    }
}

fn diff(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

fn cumsum(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut total = 0.0;
    values
        .map(|x| {
            total += x;
            total
        })
        .collect()
}

// ---------------------------------------------------------------------------

/// Proximity match. Shares the condition slot with [`Comparison`] but has
/// a disjoint vocabulary; when one of these tokens appears, the comparison
/// table is bypassed entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestMatch {
    Nearest,
    NearestForward,
    NearestBackward,
}

impl NearestMatch {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "nearest" => Ok(NearestMatch::Nearest),
            "nearest forward" => Ok(NearestMatch::NearestForward),
            "nearest backward" => Ok(NearestMatch::NearestBackward),
            _ => Err(QueryError::UnknownToken {
                slot: "condition",
                token: token.to_string(),
            }),
        }
    }

    /// Mask of the entries closest to `value`. Ties are all marked true.
    ///
    /// The directional forms restrict the candidates to entries at or
    /// above (`forward`) / at or below (`backward`) the target, and fail
    /// when no candidate survives the restriction.
    pub fn apply(self, data: &[f64], value: f64) -> Result<Vec<bool>> {
        let distance: Vec<Option<f64>> = data
            .iter()
            .map(|x| match self {
                NearestMatch::Nearest => Some((x - value).abs()),
                NearestMatch::NearestForward => {
                    let delta = x - value;
                    (delta >= 0.0).then_some(delta)
                }
                NearestMatch::NearestBackward => {
                    let delta = value - x;
                    (delta >= 0.0).then_some(delta)
                }
            })
            .collect();

        let Some(best) = distance.iter().flatten().copied().min_by(f64::total_cmp) else {
            return match self {
                // Only reachable with no data at all; an empty mask is
                // the same answer an elementwise comparison would give.
                NearestMatch::Nearest => Ok(Vec::new()),
                NearestMatch::NearestForward => Err(QueryError::NoForwardMatch),
                NearestMatch::NearestBackward => Err(QueryError::NoBackwardMatch),
            };
        };

        Ok(distance.iter().map(|d| *d == Some(best)).collect())
    }
}

// ---------------------------------------------------------------------------

/// The condition slot of a triple: either an elementwise comparison or a
/// proximity match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Compare(Comparison),
    Nearest(NearestMatch),
}

impl Condition {
    /// Parse a condition token, trying the comparison vocabulary first
    /// and the nearest-match vocabulary second.
    pub fn from_token(token: &str) -> Result<Self> {
        if let Ok(cmp) = Comparison::from_token(token) {
            return Ok(Condition::Compare(cmp));
        }
        NearestMatch::from_token(token).map(Condition::Nearest)
    }
}

// ---------------------------------------------------------------------------

/// How the per-triple masks combine into the final selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyTo {
    /// Logical AND: a record must satisfy every condition.
    #[default]
    All,
    /// Logical OR: a record must satisfy at least one condition.
    Any,
}

impl ApplyTo {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "all" => Ok(ApplyTo::All),
            "any" => Ok(ApplyTo::Any),
            _ => Err(QueryError::InvalidMode(token.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_tokens_and_aliases() {
        assert_eq!(Comparison::from_token("equal").unwrap(), Comparison::Eq);
        assert_eq!(Comparison::from_token("equality").unwrap(), Comparison::Eq);
        assert_eq!(
            Comparison::from_token("exact match").unwrap(),
            Comparison::Eq
        );
        assert_eq!(
            Comparison::from_token("lesser than").unwrap(),
            Comparison::Lt
        );
        assert_eq!(
            Comparison::from_token("lesser than or equal").unwrap(),
            Comparison::Le
        );
        let err = Comparison::from_token("roughly equal").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownToken {
                slot: "condition",
                token: "roughly equal".into()
            }
        );
    }

    #[test]
    fn greater_than_elementwise() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mask = Comparison::Gt.apply(&data, &3.0);
        assert_eq!(mask, vec![false, false, false, true, true]);
    }

    #[test]
    fn comparisons_work_on_text() {
        let data = ["US".to_string(), "Italy".to_string()];
        let mask = Comparison::Eq.apply(&data, &"US".to_string());
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn ordered_text_comparisons_are_lexicographic() {
        let data = ["Italy".to_string(), "Spain".to_string(), "US".to_string()];
        let pivot = "Spain".to_string();
        assert_eq!(Comparison::Lt.apply(&data, &pivot), vec![true, false, false]);
        assert_eq!(Comparison::Ge.apply(&data, &pivot), vec![false, true, true]);
        assert_eq!(Comparison::Ne.apply(&data, &pivot), vec![true, false, true]);
    }

    #[test]
    fn statistic_values() {
        let data = [2.0, 4.0, 6.0];
        assert_eq!(Statistic::Mean.reduce(&data), 4.0);
        assert_eq!(Statistic::Median.reduce(&data), 4.0);
        assert_eq!(Statistic::Median.reduce(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        // population std of [2,4,6] = sqrt(8/3)
        let std = Statistic::StandardDeviation.reduce(&data);
        assert!((std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        // sem = sample std / sqrt(n) = 2 / sqrt(3)
        let sem = Statistic::StandardError.reduce(&data);
        assert!((sem - 2.0 / 3.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn modifier_transforms() {
        let data = [1.0, 4.0, 2.0];
        assert_eq!(Modifier::Delta.apply(&data), vec![3.0, -2.0]);
        assert_eq!(Modifier::AbsoluteDelta.apply(&data), vec![3.0, 2.0]);
        assert_eq!(Modifier::CumulativeSum.apply(&data), vec![1.0, 5.0, 7.0]);
        assert_eq!(
            Modifier::AbsoluteCumulativeSum.apply(&[1.0, -4.0, 2.0]),
            vec![1.0, 5.0, 7.0]
        );
        assert!(Modifier::Delta.shrinks());
        assert!(Modifier::AbsoluteDelta.shrinks());
        assert!(!Modifier::CumulativeSum.shrinks());
    }

    #[test]
    fn nearest_marks_all_ties() {
        let data = [1.0, 3.0, 3.0, 5.0];
        let mask = NearestMatch::Nearest.apply(&data, 3.0).unwrap();
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn nearest_forward_and_backward() {
        let data = [1.0, 4.0, 9.0];
        let fwd = NearestMatch::NearestForward.apply(&data, 2.0).unwrap();
        assert_eq!(fwd, vec![false, true, false]);
        let back = NearestMatch::NearestBackward.apply(&data, 8.0).unwrap();
        assert_eq!(back, vec![false, true, false]);
    }

    #[test]
    fn nearest_forward_fails_above_maximum() {
        let err = NearestMatch::NearestForward
            .apply(&[1.0, 2.0, 3.0], 10.0)
            .unwrap_err();
        assert_eq!(err, QueryError::NoForwardMatch);
    }

    #[test]
    fn nearest_on_empty_data_yields_empty_mask() {
        let mask = NearestMatch::Nearest.apply(&[], 3.0).unwrap();
        assert!(mask.is_empty());
        assert_eq!(
            NearestMatch::NearestForward.apply(&[], 3.0).unwrap_err(),
            QueryError::NoForwardMatch
        );
    }

    #[test]
    fn nearest_backward_fails_below_minimum() {
        let err = NearestMatch::NearestBackward
            .apply(&[1.0, 2.0, 3.0], 0.5)
            .unwrap_err();
        assert_eq!(err, QueryError::NoBackwardMatch);
    }

    #[test]
    fn condition_slot_covers_both_vocabularies() {
        assert_eq!(
            Condition::from_token("greater than").unwrap(),
            Condition::Compare(Comparison::Gt)
        );
        assert_eq!(
            Condition::from_token("nearest forward").unwrap(),
            Condition::Nearest(NearestMatch::NearestForward)
        );
        assert!(Condition::from_token("closest").is_err());
    }

    #[test]
    fn apply_to_tokens() {
        assert_eq!(ApplyTo::from_token("all").unwrap(), ApplyTo::All);
        assert_eq!(ApplyTo::from_token("any").unwrap(), ApplyTo::Any);
        assert_eq!(
            ApplyTo::from_token("some").unwrap_err(),
            QueryError::InvalidMode("some".into())
        );
    }
}
