//! Model persistence via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::{
    ForestError,
    attribute::AttributeDescriptor,
    config::ForestConfig,
    forest::Forest,
    runtime::RuntimeTree,
    tree::FeatureMode,
};

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model. Field order is the on-disk
/// layout. The out-of-bag estimate is not persisted.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    format_version: u32,
    /// Descriptor codes: -1 inactive, 0 continuous, k > 0 categorical.
    descriptor: Vec<i32>,
    n_classes: usize,
    n_trees: usize,
    train_fraction: f64,
    /// 0 = unlimited.
    max_depth: usize,
    min_objects: usize,
    feature_mode: FeatureMode,
    seed: u64,
    trees: Vec<RuntimeTree>,
}

fn malformed(reason: impl Into<String>) -> ForestError {
    ForestError::MalformedModel {
        reason: reason.into(),
    }
}

impl Forest {
    /// Encode the model into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::SerializeModel`] if bincode encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ForestError> {
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            descriptor: self.descriptor.codes(),
            n_classes: self.n_classes,
            n_trees: self.trees.len(),
            train_fraction: self.config.train_fraction,
            max_depth: self.config.max_depth.unwrap_or(0),
            min_objects: self.config.min_objects,
            feature_mode: self.config.feature_mode,
            seed: self.config.seed,
            trees: self.trees.clone(),
        };
        bincode::serialize(&envelope).map_err(|e| ForestError::SerializeModel { source: e })
    }

    /// Decode and validate a model produced by [`Forest::to_bytes`].
    ///
    /// Nothing is returned unless every tree passes
    /// [`RuntimeTree::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedModel`] for truncated or corrupt bytes,
    /// an unknown format version, or any structural inconsistency.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ForestError> {
        let envelope: ModelEnvelope =
            bincode::deserialize(bytes).map_err(|e| malformed(format!("undecodable: {e}")))?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(malformed(format!(
                "format version {} (expected {FORMAT_VERSION})",
                envelope.format_version
            )));
        }
        let descriptor = AttributeDescriptor::from_codes(&envelope.descriptor)
            .map_err(|e| malformed(e.to_string()))?;
        if envelope.n_classes == 0 {
            return Err(malformed("zero classes"));
        }
        if envelope.n_trees == 0 || envelope.n_trees != envelope.trees.len() {
            return Err(malformed(format!(
                "header declares {} trees, body holds {}",
                envelope.n_trees,
                envelope.trees.len()
            )));
        }
        if !(0.0..=1.0).contains(&envelope.train_fraction) {
            return Err(malformed(format!(
                "train fraction {} outside [0, 1]",
                envelope.train_fraction
            )));
        }

        let mut trees = envelope.trees;
        for (i, tree) in trees.iter_mut().enumerate() {
            tree.n_classes = envelope.n_classes;
            tree.validate(descriptor.len()).map_err(|e| match e {
                ForestError::MalformedModel { reason } => malformed(format!("tree {i}: {reason}")),
                other => other,
            })?;
        }

        let config = ForestConfig {
            n_trees: envelope.n_trees,
            min_objects: envelope.min_objects,
            max_depth: Some(envelope.max_depth).filter(|&d| d > 0),
            train_fraction: envelope.train_fraction,
            feature_mode: envelope.feature_mode,
            seed: envelope.seed,
        };

        Ok(Self {
            config,
            descriptor,
            n_classes: envelope.n_classes,
            trees,
        })
    }

    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SerializeModel`] | bincode encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        std::fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.trees.len(),
            "model saved"
        );
        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::MalformedModel`] | contents are not a valid model |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;
        let forest = Self::from_bytes(&bytes)?;

        debug!(
            n_trees = forest.n_trees(),
            n_attributes = forest.n_attributes(),
            n_classes = forest.n_classes,
            "model loaded"
        );
        Ok(forest)
    }
}
