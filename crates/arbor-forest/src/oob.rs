//! Out-of-bag vote tallying and error estimation.

use crate::confusion::ConfusionMatrix;
use crate::instance::InstanceSource;

/// Per-instance, per-class out-of-bag vote counts, shared by all trees of one
/// training run.
#[derive(Debug, Clone)]
pub(crate) struct OobVotes {
    counts: Vec<u32>,
    n_classes: usize,
}

impl OobVotes {
    pub(crate) fn new(n_instances: usize, n_classes: usize) -> Self {
        Self {
            counts: vec![0; n_instances * n_classes],
            n_classes,
        }
    }

    /// Add one vote for `class` on `instance`.
    pub(crate) fn record(&mut self, instance: usize, class: usize) {
        self.counts[instance * self.n_classes + class] += 1;
    }

    fn votes_of(&self, instance: usize) -> &[u32] {
        let start = instance * self.n_classes;
        &self.counts[start..start + self.n_classes]
    }

    /// Turn the tallies into an estimate against the true classes in `source`.
    ///
    /// An instance is evaluated when it has at least one vote. Its predicted
    /// class is the first class with the most votes; if every class has the
    /// same count it is counted as evaluated but never as an error.
    pub(crate) fn estimate<S: InstanceSource + ?Sized>(&self, source: &S) -> OobEstimate {
        let mut confusion = ConfusionMatrix::new(self.n_classes);
        let mut n_evaluated = 0usize;
        let mut n_tied = 0usize;
        let mut n_wrong = 0usize;

        for instance in 0..source.instance_count() {
            let votes = self.votes_of(instance);
            if votes.iter().all(|&v| v == 0) {
                continue;
            }
            n_evaluated += 1;
            if votes.iter().all(|&v| v == votes[0]) {
                n_tied += 1;
                continue;
            }
            let mut predicted = 0;
            for (class, &v) in votes.iter().enumerate().skip(1) {
                if v > votes[predicted] {
                    predicted = class;
                }
            }
            let actual = source.class_of(instance);
            confusion.record(actual, predicted);
            if predicted != actual {
                n_wrong += 1;
            }
        }

        let error = (n_evaluated > 0).then(|| n_wrong as f64 / n_evaluated as f64);
        OobEstimate {
            error,
            n_evaluated,
            n_tied,
            confusion,
        }
    }
}

/// Out-of-bag error estimate of a training run.
///
/// Not persisted with the model; it exists only on the training result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OobEstimate {
    /// Fraction of evaluated instances whose majority out-of-bag vote is
    /// wrong. `None` when no instance was ever out of bag (no bagging).
    pub error: Option<f64>,
    /// Instances with at least one out-of-bag vote.
    pub n_evaluated: usize,
    /// Evaluated instances whose class votes were all equal.
    pub n_tied: usize,
    /// Actual vs. majority-vote class, over evaluated non-tied instances.
    pub confusion: ConfusionMatrix,
}
