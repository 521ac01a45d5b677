use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    ForestError,
    attribute::{AttributeDescriptor, AttributeIndex},
    instance::{InstanceSource, validate_training},
    node::{Condition, Node, NodeIndex, argmax},
    oob::OobVotes,
    split::{class_counts, find_best_split},
};

/// How many attributes are evaluated at each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FeatureMode {
    /// Every attribute still available on the path (plain bagging).
    All,
    /// `ceil(sqrt(available))` attributes drawn without replacement per node.
    Sqrt,
}

/// Configuration for a single entropy-split decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter        | Default             |
/// |------------------|---------------------|
/// | `min_objects`    | 1                   |
/// | `max_depth`      | `None` (unlimited)  |
/// | `feature_mode`   | `Sqrt`              |
/// | `train_fraction` | 1.0 (no bagging)    |
/// | `seed`           | 0 (system-seeded)   |
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeConfig {
    pub(crate) min_objects: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) feature_mode: FeatureMode,
    pub(crate) train_fraction: f64,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_objects: 1,
            max_depth: None,
            feature_mode: FeatureMode::Sqrt,
            train_fraction: 1.0,
            seed: 0,
        }
    }

    /// Set the minimum number of instances a node needs to be split.
    #[must_use]
    pub fn with_min_objects(mut self, min_objects: usize) -> Self {
        self.min_objects = min_objects;
        self
    }

    /// Set the maximum tree depth (root is depth 0).
    ///
    /// `None` and `Some(0)` both mean unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth.filter(|&d| d > 0);
        self
    }

    /// Set the per-node attribute sampling mode.
    #[must_use]
    pub fn with_feature_mode(mut self, feature_mode: FeatureMode) -> Self {
        self.feature_mode = feature_mode;
        self
    }

    /// Set the bagging fraction. `0.0` and `1.0` train on every instance.
    #[must_use]
    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    /// Set the random seed. `0` draws a fresh seed from the system.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

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

    /// Return the attribute sampling mode.
    #[must_use]
    pub fn feature_mode(&self) -> FeatureMode {
        self.feature_mode
    }

    /// Return the bagging fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return `true` when the train fraction selects a strict subsample.
    #[must_use]
    pub fn is_bagging(&self) -> bool {
        self.train_fraction > 0.0 && self.train_fraction < 1.0
    }

    /// Train one decision tree.
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
    #[instrument(skip(self, source, descriptor), fields(n_instances = source.instance_count()))]
    pub fn fit<S: InstanceSource + ?Sized>(
        &self,
        source: &S,
        descriptor: &AttributeDescriptor,
    ) -> Result<DecisionTree, ForestError> {
        validate_train_fraction(self.train_fraction)?;
        let n_classes = validate_training(source, descriptor)?;
        let mut rng = seeded_rng(self.seed);
        let (tree, _) = grow_tree(self, source, descriptor, n_classes, &mut rng, None);
        Ok(tree)
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_train_fraction(fraction: f64) -> Result<(), ForestError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(ForestError::InvalidTrainFraction { fraction });
    }
    Ok(())
}

/// Seed a ChaCha stream, drawing the seed from the thread RNG when `seed` is 0.
pub(crate) fn seeded_rng(seed: u64) -> ChaCha8Rng {
    let seed = if seed == 0 {
        let drawn: u64 = rand::thread_rng().r#gen();
        debug!(seed = drawn, "drew system seed");
        drawn
    } else {
        seed
    };
    ChaCha8Rng::seed_from_u64(seed)
}

/// Grow one tree: sample the bag, induce the node arena, then classify the
/// out-of-bag instances into `votes` with the freshly grown tree.
///
/// Randomness is consumed in a fixed order: one Bernoulli draw per instance
/// (when bagging), then attribute draws in depth-first node order.
///
/// Returns the tree and the number of out-of-bag instances.
pub(crate) fn grow_tree<S: InstanceSource + ?Sized>(
    config: &DecisionTreeConfig,
    source: &S,
    descriptor: &AttributeDescriptor,
    n_classes: usize,
    rng: &mut ChaCha8Rng,
    votes: Option<&mut OobVotes>,
) -> (DecisionTree, usize) {
    let (bag, out_of_bag) = draw_bag(config, source.instance_count(), rng);

    let mut grower = Grower {
        source,
        descriptor,
        n_classes,
        config,
        rng,
        arena: Vec::new(),
    };
    let uniform = vec![1.0 / n_classes as f64; n_classes];
    grower.grow(&bag, &descriptor.active_attributes(), 0, None, &uniform);

    let tree = DecisionTree {
        nodes: grower.arena,
        n_attributes: descriptor.len(),
        n_classes,
    };

    if let Some(votes) = votes {
        for &i in &out_of_bag {
            if let Some(class) = tree.classify(&source.row_at(i), None) {
                votes.record(i, class);
            }
        }
    }

    debug!(
        n_bag = bag.len(),
        n_out_of_bag = out_of_bag.len(),
        n_nodes = tree.n_nodes(),
        n_leaves = tree.n_leaves(),
        "decision tree grown"
    );

    (tree, out_of_bag.len())
}

/// Split `0..n_instances` into the training bag and the out-of-bag rest.
///
/// Each instance joins the bag independently with probability
/// `train_fraction`, so the bag size varies between trees. Without bagging
/// every instance is in the bag.
fn draw_bag(
    config: &DecisionTreeConfig,
    n_instances: usize,
    rng: &mut ChaCha8Rng,
) -> (Vec<usize>, Vec<usize>) {
    if !config.is_bagging() {
        return ((0..n_instances).collect(), Vec::new());
    }
    let mut bag = Vec::with_capacity(n_instances);
    let mut out_of_bag = Vec::new();
    for i in 0..n_instances {
        if rng.r#gen::<f64>() < config.train_fraction {
            bag.push(i);
        } else {
            out_of_bag.push(i);
        }
    }
    (bag, out_of_bag)
}

struct Grower<'a, S: ?Sized> {
    source: &'a S,
    descriptor: &'a AttributeDescriptor,
    n_classes: usize,
    config: &'a DecisionTreeConfig,
    rng: &'a mut ChaCha8Rng,
    arena: Vec<Node>,
}

impl<S: InstanceSource + ?Sized> Grower<'_, S> {
    /// Recursively grow the subtree for `instances`, returning its arena index.
    ///
    /// `available` holds the attributes not yet split on along this path.
    /// An empty node inherits `parent_distribution`.
    fn grow(
        &mut self,
        instances: &[usize],
        available: &[AttributeIndex],
        depth: usize,
        condition: Option<Condition>,
        parent_distribution: &[f64],
    ) -> NodeIndex {
        let n = instances.len();
        let counts = class_counts(self.source, instances, self.n_classes);
        let distribution: Vec<f64> = if n == 0 {
            parent_distribution.to_vec()
        } else {
            counts.iter().map(|&c| c as f64 / n as f64).collect()
        };

        let idx = self.arena.len();
        self.arena.push(Node {
            condition,
            distribution,
            branches: Vec::new(),
            n_instances: n,
        });

        // Stopping conditions -> leaf.
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        let pure = counts.contains(&n);
        if n == 0 || n < self.config.min_objects || available.is_empty() || pure || depth_reached
        {
            return NodeIndex::new(idx);
        }

        let candidates = self.select_attributes(available);
        let Some(split) =
            find_best_split(self.source, self.descriptor, instances, &candidates, &counts)
        else {
            return NodeIndex::new(idx);
        };

        // An attribute is never split on twice along one path.
        let remaining: Vec<AttributeIndex> = available
            .iter()
            .copied()
            .filter(|&a| a != split.attribute)
            .collect();
        let distribution = self.arena[idx].distribution.clone();

        let mut branches = Vec::with_capacity(split.conditions.len());
        for (condition, partition) in split.conditions.into_iter().zip(&split.partitions) {
            branches.push(self.grow(
                partition,
                &remaining,
                depth + 1,
                Some(condition),
                &distribution,
            ));
        }
        self.arena[idx].branches = branches;

        NodeIndex::new(idx)
    }

    fn select_attributes(&mut self, available: &[AttributeIndex]) -> Vec<AttributeIndex> {
        match self.config.feature_mode {
            FeatureMode::All => available.to_vec(),
            FeatureMode::Sqrt => {
                let n = available.len();
                let take = (n as f64).sqrt().ceil() as usize;
                let mut order = available.to_vec();
                // Partial Fisher-Yates over the first `take` positions.
                for i in 0..take {
                    let j = self.rng.gen_range(i..n);
                    order.swap(i, j);
                }
                order.truncate(take);
                order.sort_unstable();
                order
            }
        }
    }
}

/// Traversal shared by the training-time and the compiled tree.
///
/// From the root, the branches of the current node are tested in order and
/// traversal descends into the first match. It stops at a node without
/// branches or when no branch matches (e.g. an unseen category), and that
/// node's distribution is the result.
pub trait ClassifyTree {
    /// Number of classes in each distribution.
    fn n_classes(&self) -> usize;

    /// Distribution of the node where traversal of `row` stops, or `None`
    /// when the tree cannot resolve it.
    ///
    /// # Panics
    ///
    /// May panic if `row` is shorter than the trained attribute count.
    fn resolve(&self, row: &[f64]) -> Option<&[f64]>;

    /// Classify `row`, returning the first class with maximal probability.
    ///
    /// When `distribution` is given, the full class distribution is copied
    /// into it.
    ///
    /// # Panics
    ///
    /// Panics if `distribution` does not have exactly `n_classes` entries.
    fn classify(&self, row: &[f64], distribution: Option<&mut [f64]>) -> Option<usize> {
        let resolved = self.resolve(row)?;
        if let Some(buffer) = distribution {
            buffer.copy_from_slice(resolved);
        }
        Some(argmax(resolved))
    }
}

/// A training-time decision tree.
///
/// Nodes live in an arena addressed by [`NodeIndex`]; the root is index 0 and
/// indices follow depth-first creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_attributes: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Return the root node index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Return the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this tree.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Return all nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the number of attributes rows must carry.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    /// Return the maximum depth of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            max_depth = max_depth.max(d);
            for child in &self.nodes[node_idx].branches {
                queue.push_back((child.index(), d + 1));
            }
        }

        max_depth
    }
}

impl ClassifyTree for DecisionTree {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn resolve(&self, row: &[f64]) -> Option<&[f64]> {
        let mut node = self.nodes.first()?;
        'descend: loop {
            for child in &node.branches {
                let candidate = &self.nodes[child.index()];
                if candidate.condition.is_some_and(|c| c.matches(row)) {
                    node = candidate;
                    continue 'descend;
                }
            }
            return Some(&node.distribution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKind;
    use crate::instance::DenseInstances;
    use crate::node::Comparison;

    fn fit(
        rows: &[Vec<f64>],
        classes: Vec<usize>,
        codes: &[i32],
        config: DecisionTreeConfig,
    ) -> DecisionTree {
        let data = DenseInstances::from_rows(rows, classes).unwrap();
        let descriptor = AttributeDescriptor::from_codes(codes).unwrap();
        config.fit(&data, &descriptor).unwrap()
    }

    #[test]
    fn bernoulli_bag_partitions_instances() {
        let config = DecisionTreeConfig::new().with_train_fraction(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut oob_sizes = Vec::new();
        for _ in 0..8 {
            let (bag, out_of_bag) = draw_bag(&config, 200, &mut rng);
            let mut all: Vec<usize> = bag.iter().chain(&out_of_bag).copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..200).collect::<Vec<_>>());
            assert!(bag.windows(2).all(|w| w[0] < w[1]));
            assert!(out_of_bag.windows(2).all(|w| w[0] < w[1]));
            assert!((50..150).contains(&bag.len()), "bag size {}", bag.len());
            oob_sizes.push(out_of_bag.len());
        }
        oob_sizes.dedup();
        assert!(oob_sizes.len() > 1, "out-of-bag size never changed: {oob_sizes:?}");
    }

    #[test]
    fn full_fraction_bags_everything() {
        let config = DecisionTreeConfig::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (bag, out_of_bag) = draw_bag(&config, 5, &mut rng);
        assert_eq!(bag, vec![0, 1, 2, 3, 4]);
        assert!(out_of_bag.is_empty());
    }

    #[test]
    fn grow_tree_reports_out_of_bag_count() {
        let rows: Vec<Vec<f64>> = (0..40_u32).map(|i| vec![f64::from(i % 2)]).collect();
        let classes: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let data = DenseInstances::from_rows(&rows, classes).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[2]).unwrap();
        let config = DecisionTreeConfig::new().with_train_fraction(0.5);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (_, n_oob) = grow_tree(&config, &data, &descriptor, 2, &mut rng, None);

        let mut replay = ChaCha8Rng::seed_from_u64(5);
        let (_, expected) = draw_bag(&config, 40, &mut replay);
        assert_eq!(n_oob, expected.len());
        assert!(n_oob > 0 && n_oob < 40);
    }

    #[test]
    fn perfectly_correlated_binary_attribute() {
        let tree = fit(
            &[vec![0.0], vec![0.0], vec![1.0], vec![1.0]],
            vec![0, 0, 1, 1],
            &[2],
            DecisionTreeConfig::new().with_seed(7),
        );
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);

        let root = tree.node(tree.root());
        assert_eq!(root.branches.len(), 2);
        assert_eq!(root.distribution, vec![0.5, 0.5]);

        let left = tree.node(root.branches[0]);
        let right = tree.node(root.branches[1]);
        assert_eq!(left.distribution, vec![1.0, 0.0]);
        assert_eq!(right.distribution, vec![0.0, 1.0]);
        assert!(left.is_leaf() && right.is_leaf());
        let c = left.condition.unwrap();
        assert_eq!(c.attribute.index(), 0);
        assert_eq!(c.comparison, Comparison::Equal);
        assert_eq!(c.value, 0.0);
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let tree = fit(
            &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![1, 1, 1],
            &[0, 0],
            DecisionTreeConfig::new().with_seed(1),
        );
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.classify(&[2.0, 3.0], None), Some(1));
    }

    #[test]
    fn all_inactive_descriptor_gives_single_leaf() {
        let tree = fit(
            &[vec![0.0], vec![1.0], vec![1.0]],
            vec![0, 1, 1],
            &[-1],
            DecisionTreeConfig::new().with_seed(3),
        );
        assert_eq!(tree.n_nodes(), 1);
        let mut buffer = [0.0; 2];
        assert_eq!(tree.classify(&[0.0], Some(&mut buffer)), Some(1));
        assert!((buffer[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn continuous_threshold_split() {
        let tree = fit(
            &[vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]],
            vec![0, 0, 0, 1, 1, 1],
            &[0],
            DecisionTreeConfig::new().with_seed(42),
        );
        assert_eq!(tree.classify(&[2.5], None), Some(0));
        assert_eq!(tree.classify(&[6.5], None), Some(1));
        assert_eq!(tree.classify(&[6.4], None), Some(0));
    }

    #[test]
    fn attribute_not_reused_along_path() {
        // Needs two thresholds on attribute 0 to separate; only one is allowed.
        let tree = fit(
            &[vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0], vec![6.0]],
            vec![0, 0, 1, 1, 0, 0],
            &[0],
            DecisionTreeConfig::new().with_seed(42),
        );
        assert_eq!(tree.depth(), 1);
        for node in tree.nodes().iter().skip(1) {
            assert!(node.is_leaf());
        }
    }

    #[test]
    fn xor_needs_two_levels() {
        let tree = fit(
            &[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
            vec![0, 1, 1, 0],
            &[2, 2],
            DecisionTreeConfig::new()
                .with_feature_mode(FeatureMode::All)
                .with_seed(42),
        );
        assert_eq!(tree.depth(), 2);
        for (row, class) in [([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1), ([1.0, 1.0], 0)] {
            assert_eq!(tree.classify(&row, None), Some(class));
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        let tree = fit(
            &[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
            vec![0, 1, 1, 0],
            &[2, 2],
            DecisionTreeConfig::new()
                .with_feature_mode(FeatureMode::All)
                .with_max_depth(Some(1))
                .with_seed(42),
        );
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn max_depth_zero_is_unlimited() {
        let config = DecisionTreeConfig::new().with_max_depth(Some(0));
        assert_eq!(config.max_depth(), None);
    }

    #[test]
    fn min_objects_stops_small_nodes() {
        let tree = fit(
            &[vec![0.0], vec![0.0], vec![1.0], vec![1.0]],
            vec![0, 0, 1, 1],
            &[2],
            DecisionTreeConfig::new().with_min_objects(5).with_seed(1),
        );
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn unseen_category_stops_at_parent() {
        let tree = fit(
            &[vec![0.0], vec![0.0], vec![0.0], vec![1.0]],
            vec![0, 0, 0, 1],
            &[3],
            DecisionTreeConfig::new().with_seed(1),
        );
        let mut buffer = [0.0; 2];
        // Category 2 has no training instances and inherits the root distribution;
        // category 7 and -1 match no branch at all.
        for value in [2.0, 7.0, -1.0] {
            assert_eq!(tree.classify(&[value], Some(&mut buffer)), Some(0));
            assert_eq!(buffer, [0.75, 0.25]);
        }
    }

    #[test]
    fn empty_category_branch_inherits_parent_distribution() {
        let tree = fit(
            &[vec![0.0], vec![2.0], vec![2.0]],
            vec![0, 1, 1],
            &[3],
            DecisionTreeConfig::new().with_seed(1),
        );
        let root = tree.node(tree.root());
        let empty = tree.node(root.branches[1]);
        assert_eq!(empty.n_instances, 0);
        assert_eq!(empty.distribution, root.distribution);
    }

    #[test]
    fn missing_category_excluded_from_branches() {
        let tree = fit(
            &[vec![0.0], vec![-1.0], vec![1.0], vec![1.0]],
            vec![0, 0, 1, 1],
            &[2],
            DecisionTreeConfig::new().with_seed(1),
        );
        let root = tree.node(tree.root());
        let branch_total: usize = root
            .branches
            .iter()
            .map(|&b| tree.node(b).n_instances)
            .sum();
        assert_eq!(root.n_instances, 4);
        assert_eq!(branch_total, 3);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 7) as f64, (i * 13 % 11) as f64, (i % 3) as f64])
            .collect();
        let classes: Vec<usize> = (0..40).map(|i| (i % 7 + i % 3) % 2).collect();
        let config = DecisionTreeConfig::new()
            .with_train_fraction(0.7)
            .with_seed(123);
        let a = fit(&rows, classes.clone(), &[0, 0, 3], config.clone());
        let b = fit(&rows, classes, &[0, 0, 3], config);
        assert_eq!(a, b);
    }

    #[test]
    fn sqrt_mode_samples_ceil_sqrt() {
        let descriptor = AttributeDescriptor::new(vec![AttributeKind::Continuous; 10]).unwrap();
        let data = DenseInstances::from_rows(&[vec![0.0; 10]], vec![0]).unwrap();
        let config = DecisionTreeConfig::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grower = Grower {
            source: &data,
            descriptor: &descriptor,
            n_classes: 1,
            config: &config,
            rng: &mut rng,
            arena: Vec::new(),
        };
        let picked = grower.select_attributes(&descriptor.active_attributes());
        assert_eq!(picked.len(), 4);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invalid_train_fraction_error() {
        let data = DenseInstances::from_rows(&[vec![0.0]], vec![0]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[0]).unwrap();
        let err = DecisionTreeConfig::new()
            .with_train_fraction(1.5)
            .fit(&data, &descriptor)
            .unwrap_err();
        assert!(matches!(err, ForestError::InvalidTrainFraction { .. }));
    }
}
