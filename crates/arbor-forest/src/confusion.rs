//! Confusion matrix and per-class metrics.

use std::fmt;

use crate::error::ForestError;

/// A square confusion matrix.
///
/// `matrix[actual][predicted]` counts instances of class `actual` that were
/// classified as `predicted`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// TP / (TP + FP), or 0.0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN), or 0.0 when the class never occurs.
    pub recall: f64,
    /// Harmonic mean of precision and recall, or 0.0 when both are zero.
    pub f1: f64,
    /// Number of instances whose actual class is `class`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Create an all-zero matrix for `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            matrix: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Build a matrix from parallel slices of actual and predicted classes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | `actual` is empty |
    /// | [`ForestError::ClassCountMismatch`] | the slices differ in length |
    /// | [`ForestError::ClassOutOfRange`] | a label is `>= n_classes` |
    pub fn from_labels(
        actual: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, ForestError> {
        if actual.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if actual.len() != predicted.len() {
            return Err(ForestError::ClassCountMismatch {
                instances: actual.len(),
                classes: predicted.len(),
            });
        }
        let mut cm = Self::new(n_classes);
        for (index, (&a, &p)) in actual.iter().zip(predicted).enumerate() {
            if let Some(class) = [a, p].into_iter().find(|&c| c >= n_classes) {
                return Err(ForestError::ClassOutOfRange {
                    index,
                    class,
                    limit: n_classes as u64,
                });
            }
            cm.record(a, p);
        }
        Ok(cm)
    }

    /// Count one classification.
    ///
    /// # Panics
    ///
    /// Panics if either class is `>= n_classes`.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.matrix[actual][predicted] += 1;
    }

    /// Total number of recorded classifications.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Number of recorded classifications on the diagonal.
    #[must_use]
    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|i| self.matrix[i][i]).sum()
    }

    /// Proportion of correct classifications, 0.0 when empty.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1 and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.n_classes();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the matrix rows, indexed by actual class.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes() {
            write!(f, " pred_{j:>3}")?;
        }
        writeln!(f)?;

        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:>3}")?;
            for count in row {
                write!(f, " {count:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
