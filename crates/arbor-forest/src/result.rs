//! Training result types.

use crate::forest::Forest;
use crate::oob::OobEstimate;

/// Summary statistics of a training run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainingMetadata {
    /// Number of trees trained.
    pub n_trees: usize,
    /// Number of training instances.
    pub n_instances: usize,
    /// Number of attributes per instance, active or not.
    pub n_attributes: usize,
    /// Number of attributes that were split candidates.
    pub n_active_attributes: usize,
    /// Number of classes (largest class label + 1).
    pub n_classes: usize,
    /// Total node count over all trees.
    pub n_nodes: usize,
    /// Total leaf count over all trees.
    pub n_leaves: usize,
}

/// Result of forest training: the model, its out-of-bag estimate, and run
/// statistics.
#[derive(Debug)]
pub struct ForestResult {
    forest: Forest,
    oob: OobEstimate,
    metadata: TrainingMetadata,
}

impl ForestResult {
    pub(crate) fn new(forest: Forest, oob: OobEstimate, metadata: TrainingMetadata) -> Self {
        Self {
            forest,
            oob,
            metadata,
        }
    }

    /// Borrow the trained forest.
    #[must_use]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Consume the result and return the trained forest.
    #[must_use]
    pub fn into_forest(self) -> Forest {
        self.forest
    }

    /// Return the out-of-bag estimate.
    #[must_use]
    pub fn oob(&self) -> &OobEstimate {
        &self.oob
    }

    /// Shortcut for `oob().error`.
    #[must_use]
    pub fn oob_error(&self) -> Option<f64> {
        self.oob.error
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
