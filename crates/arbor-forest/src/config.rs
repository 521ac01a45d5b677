//! Configuration builder for forest training.

use std::sync::atomic::AtomicBool;

use crate::{
    ForestError,
    attribute::AttributeDescriptor,
    instance::InstanceSource,
    result::ForestResult,
    tree::{DecisionTreeConfig, FeatureMode},
};

/// Default bagging fraction, the expected share of distinct instances in a
/// bootstrap sample.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.632;

/// Configuration for random forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter        | Default             |
/// |------------------|---------------------|
/// | `min_objects`    | 1                   |
/// | `max_depth`      | `None` (unlimited)  |
/// | `train_fraction` | 0.632               |
/// | `feature_mode`   | `Sqrt`              |
/// | `seed`           | 0 (system-seeded)   |
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) min_objects: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) train_fraction: f64,
    pub(crate) feature_mode: FeatureMode,
    pub(crate) seed: u64,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            min_objects: 1,
            max_depth: None,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            feature_mode: FeatureMode::Sqrt,
            seed: 0,
        })
    }

    // --- Setters ---

    /// Set the minimum number of instances a node needs to be split.
    #[must_use]
    pub fn with_min_objects(mut self, min_objects: usize) -> Self {
        self.min_objects = min_objects;
        self
    }

    /// Set the maximum tree depth. `None` and `Some(0)` both mean unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth.filter(|&d| d > 0);
        self
    }

    /// Set the bagging fraction. `0.0` and `1.0` disable bagging.
    #[must_use]
    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    /// Set the per-node attribute sampling mode.
    #[must_use]
    pub fn with_feature_mode(mut self, feature_mode: FeatureMode) -> Self {
        self.feature_mode = feature_mode;
        self
    }

    /// Set the random seed. `0` draws a fresh seed from the system.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the minimum node size for splitting.
    #[must_use]
    pub fn min_objects(&self) -> usize {
        self.min_objects
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the bagging fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the attribute sampling mode.
    #[must_use]
    pub fn feature_mode(&self) -> FeatureMode {
        self.feature_mode
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Per-tree settings shared by every tree of the forest.
    pub(crate) fn tree_config(&self) -> DecisionTreeConfig {
        DecisionTreeConfig::new()
            .with_min_objects(self.min_objects)
            .with_max_depth(self.max_depth)
            .with_feature_mode(self.feature_mode)
            .with_train_fraction(self.train_fraction)
            .with_seed(self.seed)
    }

    /// Train a random forest.
    ///
    /// Trees are grown one after another from a single random stream, so a
    /// non-zero seed reproduces the same forest bit for bit.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::InvalidTrainFraction`] | `train_fraction` is outside `[0, 1]` |
    /// | [`ForestError::EmptyDataset`] | `source` has no instances |
    /// | [`ForestError::DescriptorMismatch`] | descriptor and source disagree on attribute count |
    /// | [`ForestError::NonFiniteValue`] | a continuous value is NaN or infinite |
    /// | [`ForestError::InvalidCategory`] | a categorical value is outside `[-1, k)` |
    pub fn fit<S: InstanceSource + ?Sized>(
        &self,
        source: &S,
        descriptor: &AttributeDescriptor,
    ) -> Result<ForestResult, ForestError> {
        crate::forest::train(self, source, descriptor, None)
    }

    /// Train a random forest, checking `cancel` before each tree.
    ///
    /// # Errors
    ///
    /// Everything [`ForestConfig::fit`] returns, plus
    /// [`ForestError::Cancelled`] once `cancel` is observed as `true`.
    pub fn fit_with_cancel<S: InstanceSource + ?Sized>(
        &self,
        source: &S,
        descriptor: &AttributeDescriptor,
        cancel: &AtomicBool,
    ) -> Result<ForestResult, ForestError> {
        crate::forest::train(self, source, descriptor, Some(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ForestConfig::new(10).unwrap();
        assert_eq!(config.n_trees(), 10);
        assert_eq!(config.min_objects(), 1);
        assert_eq!(config.max_depth(), None);
        assert!((config.train_fraction() - 0.632).abs() < 1e-12);
        assert_eq!(config.feature_mode(), FeatureMode::Sqrt);
        assert_eq!(config.seed(), 0);
    }

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            ForestConfig::new(0),
            Err(ForestError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn tree_config_carries_settings() {
        let config = ForestConfig::new(3)
            .unwrap()
            .with_min_objects(4)
            .with_max_depth(Some(6))
            .with_train_fraction(0.5)
            .with_feature_mode(FeatureMode::All)
            .with_seed(9);
        let tree = config.tree_config();
        assert_eq!(tree.min_objects(), 4);
        assert_eq!(tree.max_depth(), Some(6));
        assert_eq!(tree.train_fraction(), 0.5);
        assert_eq!(tree.feature_mode(), FeatureMode::All);
        assert_eq!(tree.seed(), 9);
    }
}
