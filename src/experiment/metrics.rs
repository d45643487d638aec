//! Confusion-matrix metrics for the positive class 1.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassificationMetrics {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationMetrics {
    /// Count outcomes pairwise; extra elements of the longer slice are
    /// ignored.
    pub fn from_predictions(predictions: &[usize], actual: &[usize]) -> Self {
        let (mut tp, mut tn, mut fp, mut fne) = (0, 0, 0, 0);
        for (&p, &a) in predictions.iter().zip(actual) {
            match (p == 1, a == 1) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fne += 1,
            }
        }
        Self::from_counts(tp, tn, fp, fne)
    }

    /// Ratios recomputed from counts; undefined ratios are 0.
    pub fn from_counts(tp: usize, tn: usize, fp: usize, fne: usize) -> Self {
        let total = tp + tn + fp + fne;
        let accuracy = ratio(tp + tn, total);
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fne);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            true_positive: tp,
            true_negative: tn,
            false_positive: fp,
            false_negative: fne,
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Add for ClassificationMetrics {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::from_counts(
            self.true_positive + other.true_positive,
            self.true_negative + other.true_negative,
            self.false_positive + other.false_positive,
            self.false_negative + other.false_negative,
        )
    }
}

impl Sum for ClassificationMetrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a ClassificationMetrics> for ClassificationMetrics {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Accuracy:  {:.4}%", self.accuracy * 100.0)?;
        writeln!(f, "  Precision: {:.4}%", self.precision * 100.0)?;
        writeln!(f, "  Recall:    {:.4}%", self.recall * 100.0)?;
        writeln!(f, "  F1-Score:  {:.4}", self.f1)?;
        write!(
            f,
            "  TP: {}, TN: {}, FP: {}, FN: {}",
            self.true_positive, self.true_negative, self.false_positive, self.false_negative
        )
    }
}
