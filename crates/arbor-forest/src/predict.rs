//! Ensemble classification.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    ForestError, forest::Forest, instance::InstanceSource, node::argmax, tree::ClassifyTree,
};

/// Averaged class distribution of an ensemble vote.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the predicted class: the first class with maximal probability.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        argmax(&self.probs)
    }

    /// Return the probability of the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probs[self.predicted_class()]
    }

    /// Return the top-k classes by descending probability; equal
    /// probabilities keep ascending class order.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.probs.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }

    /// Return the probabilities as a slice indexed by class.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Consume the distribution and return the probabilities.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

impl Forest {
    /// Classify a single row.
    ///
    /// # Errors
    ///
    /// See [`Forest::classify_proba`].
    pub fn classify(&self, row: &[f64]) -> Result<usize, ForestError> {
        Ok(self.classify_proba(row)?.predicted_class())
    }

    /// Average the distributions of every tree that resolves `row`.
    ///
    /// Categories never seen in training are not errors; the affected trees
    /// answer with the distribution where traversal stopped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::RowLengthMismatch`] | `row.len() != n_attributes()` |
    /// | [`ForestError::NoVotes`] | every tree abstained |
    pub fn classify_proba(&self, row: &[f64]) -> Result<ClassDistribution, ForestError> {
        if row.len() != self.n_attributes() {
            return Err(ForestError::RowLengthMismatch {
                expected: self.n_attributes(),
                got: row.len(),
            });
        }

        let mut sum = vec![0.0f64; self.n_classes];
        let mut n_votes = 0usize;
        for tree in &self.trees {
            if let Some(distribution) = tree.resolve(row) {
                for (acc, p) in sum.iter_mut().zip(distribution) {
                    *acc += p;
                }
                n_votes += 1;
            }
        }
        if n_votes == 0 {
            return Err(ForestError::NoVotes);
        }
        let n = n_votes as f64;
        sum.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(sum))
    }

    /// Classify a batch of rows in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error of any row, see [`Forest::classify_proba`].
    pub fn classify_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        rows.into_par_iter().map(|row| self.classify(row)).collect()
    }

    /// Return class distributions for a batch of rows in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error of any row, see [`Forest::classify_proba`].
    pub fn classify_proba_batch(
        &self,
        rows: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, ForestError> {
        rows.into_par_iter()
            .map(|row| self.classify_proba(row))
            .collect()
    }

    /// Return class distributions for every instance of `source` in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error of any instance, see [`Forest::classify_proba`].
    pub fn classify_instances<S: InstanceSource + Sync + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Vec<ClassDistribution>, ForestError> {
        (0..source.instance_count())
            .into_par_iter()
            .map(|i| self.classify_proba(&source.row_at(i)))
            .collect()
    }
}
