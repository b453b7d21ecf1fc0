//! Partitioning of a numeric attribute into labelled, ordered ranges.
//!
//! A [`BinDefinition`] holds boundaries `b0 < b1 < ... < bn` and one label per
//! interval. The lowest interval is `[b0, b1]`, every other one is
//! `(b[i-1], b[i]]`, so a value sitting exactly on an interior boundary belongs
//! to the interval that boundary closes.

use num::Num;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors raised while building or applying a bin definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinError {
    #[error("expected {expected} labels, got {actual}")]
    LabelCount { expected: usize, actual: usize },

    #[error("cannot bin an empty sequence of values")]
    Empty,

    #[error("boundaries must be strictly increasing, but {upper} follows {lower}")]
    NotIncreasing { lower: String, upper: String },

    #[error("value {0} cannot be ordered")]
    Unordered(String),

    #[error("value {value} lies outside [{lower}, {upper}]")]
    OutOfRange {
        value: String,
        lower: String,
        upper: String,
    },
}

type Result<T> = core::result::Result<T, BinError>;

/// The interval a value was assigned to.
///
/// Ordering follows the interval position, not the label text, so frequency
/// tables keyed by `BinLabel` enumerate in bin order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinLabel {
    index: usize,
    label: String,
}

impl BinLabel {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for BinLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Validated boundaries and labels
#[derive(Debug, Clone, PartialEq)]
pub struct BinDefinition<T> {
    boundaries: Vec<T>,
    labels: Vec<String>,
}

impl<T> BinDefinition<T>
where
    T: Num + PartialOrd + Copy + fmt::Display,
{
    /// Builds a definition from the full boundary sequence.
    ///
    /// # Errors
    /// * [`BinError::LabelCount`] unless there is exactly one label per interval
    ///   (and at least one interval)
    /// * [`BinError::NotIncreasing`] when two neighbouring boundaries are equal,
    ///   out of order, or unordered
    pub fn new<S: AsRef<str>>(boundaries: Vec<T>, labels: &[S]) -> Result<Self> {
        let expected = boundaries.len().saturating_sub(1);
        if expected == 0 || labels.len() != expected {
            return Err(BinError::LabelCount {
                expected: expected.max(1),
                actual: labels.len(),
            });
        }

        for pair in boundaries.windows(2) {
            if pair[0].partial_cmp(&pair[1]) != Some(Ordering::Less) {
                return Err(BinError::NotIncreasing {
                    lower: pair[0].to_string(),
                    upper: pair[1].to_string(),
                });
            }
        }

        Ok(Self {
            boundaries,
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        })
    }

    /// Builds a definition whose outer boundaries are the observed minimum and
    /// maximum of `values`, with `cut_points` as the interior boundaries.
    pub fn from_observed<S: AsRef<str>>(values: &[T], cut_points: &[T], labels: &[S]) -> Result<Self> {
        if labels.len() != cut_points.len() + 1 {
            return Err(BinError::LabelCount {
                expected: cut_points.len() + 1,
                actual: labels.len(),
            });
        }

        let (min, max) = extremes(values)?;
        let mut boundaries = Vec::with_capacity(cut_points.len() + 2);
        boundaries.push(min);
        boundaries.extend_from_slice(cut_points);
        boundaries.push(max);

        Self::new(boundaries, labels)
    }

    pub fn boundaries(&self) -> &[T] {
        &self.boundaries
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn lower(&self) -> T {
        self.boundaries[0]
    }

    pub fn upper(&self) -> T {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Position of the interval holding `value`, or `None` when it falls
    /// outside `[b0, bn]`.
    pub fn index_of(&self, value: T) -> Option<usize> {
        if !(value >= self.lower() && value <= self.upper()) {
            return None;
        }

        // Number of interior boundaries strictly below the value; ties land on
        // the interval the boundary closes.
        let interior = &self.boundaries[1..self.boundaries.len() - 1];
        Some(interior.partition_point(|cut| *cut < value))
    }

    /// Label of the interval holding `value`
    pub fn assign(&self, value: T) -> Result<BinLabel> {
        let index = self.index_of(value).ok_or_else(|| BinError::OutOfRange {
            value: value.to_string(),
            lower: self.lower().to_string(),
            upper: self.upper().to_string(),
        })?;

        Ok(BinLabel {
            index,
            label: self.labels[index].clone(),
        })
    }
}

/// Bins `values` into the intervals formed by the observed minimum, the interior
/// `cut_points` and the observed maximum.
///
/// Returns one label per input value, in input order.
///
/// # Errors
/// See [`BinDefinition::new`]; additionally [`BinError::Empty`] for an empty
/// input and [`BinError::Unordered`] for values such as NaN.
///
/// # Examples
/// ```
/// use noshow_analysis::binning::bin;
///
/// let labels = bin(&[5, 10, 15, 30, 31], &[10, 20, 30], &["child", "teen", "adult", "senior"])?;
/// let labels: Vec<&str> = labels.iter().map(|l| l.label()).collect();
/// assert_eq!(labels, ["child", "child", "teen", "adult", "senior"]);
/// # Ok::<(), noshow_analysis::binning::BinError>(())
/// ```
pub fn bin<T, S>(values: &[T], cut_points: &[T], labels: &[S]) -> Result<Vec<BinLabel>>
where
    T: Num + PartialOrd + Copy + fmt::Display,
    S: AsRef<str>,
{
    let definition = BinDefinition::from_observed(values, cut_points, labels)?;
    values.iter().map(|v| definition.assign(*v)).collect()
}

fn extremes<T: PartialOrd + Copy + fmt::Display>(values: &[T]) -> Result<(T, T)> {
    let (first, rest) = values.split_first().ok_or(BinError::Empty)?;
    if first.partial_cmp(first).is_none() {
        return Err(BinError::Unordered(first.to_string()));
    }

    let mut min = *first;
    let mut max = *first;
    for value in rest {
        match (value.partial_cmp(&min), value.partial_cmp(&max)) {
            (None, _) | (_, None) => return Err(BinError::Unordered(value.to_string())),
            (Some(Ordering::Less), _) => min = *value,
            (_, Some(Ordering::Greater)) => max = *value,
            _ => {}
        }
    }

    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 4] = ["child", "teen", "adult", "senior"];

    fn label_names(labels: &[BinLabel]) -> Vec<&str> {
        labels.iter().map(|l| l.label()).collect()
    }

    #[test]
    fn test_bin_with_observed_extremes() {
        let labels = bin(&[5, 10, 15, 30, 31], &[10, 20, 30], &LABELS).unwrap();
        assert_eq!(
            label_names(&labels),
            ["child", "child", "teen", "adult", "senior"]
        );
    }

    #[test]
    fn test_minimum_is_included_in_lowest_interval() {
        let labels = bin(&[0, 3, 40], &[10, 20, 30], &LABELS).unwrap();
        assert_eq!(labels[0].index(), 0);
        assert_eq!(labels[0].label(), "child");
    }

    #[test]
    fn test_interior_boundary_goes_to_interval_it_closes() {
        let definition = BinDefinition::new(vec![0, 10, 20, 30], &["a", "b", "c"]).unwrap();
        assert_eq!(definition.index_of(10), Some(0));
        assert_eq!(definition.index_of(11), Some(1));
        assert_eq!(definition.index_of(20), Some(1));
        assert_eq!(definition.index_of(30), Some(2));
    }

    #[test]
    fn test_one_label_per_value() {
        let values: Vec<i64> = (0..=115).rev().collect();
        let labels = bin(&values, &[10, 20, 30], &LABELS).unwrap();
        assert_eq!(labels.len(), values.len());
    }

    #[test]
    fn test_bin_index_is_monotonic() {
        let values: Vec<f64> = (0..=200).map(|v| v as f64 * 0.5).collect();
        let labels = bin(&values, &[10.0, 20.0, 30.0, 55.5], &["a", "b", "c", "d", "e"]).unwrap();
        for pair in labels.windows(2) {
            assert!(pair[0].index() <= pair[1].index());
        }
        assert_eq!(labels.last().map(|l| l.label()), Some("e"));
    }

    #[test]
    fn test_values_outside_fixed_definition() {
        let definition = BinDefinition::new(vec![0.0, 1.0], &["unit"]).unwrap();
        assert_eq!(definition.index_of(-0.5), None);
        assert_eq!(definition.index_of(1.5), None);
        assert_eq!(definition.index_of(f64::NAN), None);
        assert!(matches!(
            definition.assign(2.0),
            Err(BinError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_label_count_mismatch() {
        let err = bin(&[1, 2, 3], &[2], &LABELS).unwrap_err();
        assert_eq!(
            err,
            BinError::LabelCount {
                expected: 2,
                actual: 4
            }
        );
    }

    #[test]
    fn test_empty_values() {
        let values: [i64; 0] = [];
        assert_eq!(bin(&values, &[10], &["a", "b"]), Err(BinError::Empty));
    }

    #[test]
    fn test_cut_point_outside_observed_range() {
        let err = bin(&[12, 15, 18], &[10, 20], &["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, BinError::NotIncreasing { .. }));

        let err = bin(&[12, 15, 18], &[18], &["a", "b"]).unwrap_err();
        assert!(matches!(err, BinError::NotIncreasing { .. }));
    }

    #[test]
    fn test_unsorted_cut_points() {
        let err = bin(&[0, 50], &[30, 20], &["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            BinError::NotIncreasing {
                lower: "30".to_string(),
                upper: "20".to_string()
            }
        );
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = bin(&[1.0, f64::NAN, 3.0], &[2.0], &["a", "b"]).unwrap_err();
        assert!(matches!(err, BinError::Unordered(_)));
    }

    #[test]
    fn test_degenerate_definition() {
        assert!(matches!(
            BinDefinition::<i64>::new(vec![1], &[] as &[&str]),
            Err(BinError::LabelCount { .. })
        ));
        assert!(matches!(
            bin(&[4, 4, 4], &[], &["only"]),
            Err(BinError::NotIncreasing { .. })
        ));
    }
}
