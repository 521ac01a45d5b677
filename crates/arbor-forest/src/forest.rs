//! Sequential forest training and the fitted ensemble.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument};

use crate::{
    ForestError,
    attribute::AttributeDescriptor,
    compile::TreeCompiler,
    config::ForestConfig,
    instance::{InstanceSource, validate_training},
    oob::OobVotes,
    result::{ForestResult, TrainingMetadata},
    runtime::RuntimeTree,
    tree::{grow_tree, seeded_rng, validate_train_fraction},
};

/// A fitted random forest.
///
/// Holds the compiled trees together with the attribute descriptor and the
/// hyperparameters they were trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    pub(crate) config: ForestConfig,
    pub(crate) descriptor: AttributeDescriptor,
    pub(crate) n_classes: usize,
    pub(crate) trees: Vec<RuntimeTree>,
}

impl Forest {
    /// Return the hyperparameters the forest was trained with.
    #[must_use]
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Return the attribute descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &AttributeDescriptor {
        &self.descriptor
    }

    /// Return the number of attributes rows must carry.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.descriptor.len()
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the compiled trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[RuntimeTree] {
        &self.trees
    }
}

/// Train the forest one tree at a time from a single random stream.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_instances = source.instance_count()))]
pub(crate) fn train<S: InstanceSource + ?Sized>(
    config: &ForestConfig,
    source: &S,
    descriptor: &AttributeDescriptor,
    cancel: Option<&AtomicBool>,
) -> Result<ForestResult, ForestError> {
    // --- Validate everything before growing anything ---
    validate_train_fraction(config.train_fraction)?;
    let n_classes = validate_training(source, descriptor)?;
    let n_instances = source.instance_count();
    let n_active_attributes = descriptor.active_attributes().len();

    info!(
        n_trees = config.n_trees,
        n_instances,
        n_attributes = descriptor.len(),
        n_active_attributes,
        n_classes,
        train_fraction = config.train_fraction,
        "training random forest"
    );

    let tree_config = config.tree_config();
    let mut rng = seeded_rng(config.seed);
    let mut votes = OobVotes::new(n_instances, n_classes);
    let mut compiler = TreeCompiler::new();
    let mut trees = Vec::with_capacity(config.n_trees);
    let mut n_nodes = 0usize;
    let mut n_leaves = 0usize;

    for tree_index in 0..config.n_trees {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            info!(trees_completed = tree_index, "training cancelled");
            return Err(ForestError::Cancelled {
                trees_completed: tree_index,
            });
        }

        let (tree, n_out_of_bag) = grow_tree(
            &tree_config,
            source,
            descriptor,
            n_classes,
            &mut rng,
            Some(&mut votes),
        );
        let compiled = compiler.compile(&tree);
        n_nodes += compiled.n_nodes();
        n_leaves += compiled.n_leaves();

        debug!(
            tree_index,
            n_nodes = compiled.n_nodes(),
            depth = tree.depth(),
            n_out_of_bag,
            "tree trained"
        );
        trees.push(compiled);
    }

    let oob = votes.estimate(source);

    let forest = Forest {
        config: config.clone(),
        descriptor: descriptor.clone(),
        n_classes,
        trees,
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_instances,
        n_attributes: descriptor.len(),
        n_active_attributes,
        n_classes,
        n_nodes,
        n_leaves,
    };

    info!(
        oob_error = oob.error,
        oob_evaluated = oob.n_evaluated,
        n_nodes,
        "random forest training complete"
    );

    Ok(ForestResult::new(forest, oob, metadata))
}
