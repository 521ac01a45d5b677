//! Random forest classification with entropy-split decision trees.
//!
//! Trees are induced by information gain over categorical and continuous
//! attributes, bagged with an out-of-bag error estimate, and compiled into
//! flat [`RuntimeTree`]s with interned split values and class distributions
//! for classification and persistence.

mod attribute;
mod compile;
mod config;
mod confusion;
mod error;
mod forest;
mod instance;
mod node;
mod oob;
mod predict;
mod result;
mod runtime;
mod serialize;
mod split;
mod tree;

pub use attribute::{AttributeDescriptor, AttributeIndex, AttributeKind};
pub use compile::TreeCompiler;
pub use config::{DEFAULT_TRAIN_FRACTION, ForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::ForestError;
pub use forest::Forest;
pub use instance::{DenseInstances, InstanceSource, NarrowInstances, PackedInstances};
pub use node::{Comparison, Condition, Node, NodeIndex};
pub use oob::OobEstimate;
pub use predict::ClassDistribution;
pub use result::{ForestResult, TrainingMetadata};
pub use runtime::{NO_VALUE, RuntimeTree};
pub use serialize::FORMAT_VERSION;
pub use split::{MAX_THRESHOLD_CANDIDATES, entropy, information_gain};
pub use tree::{ClassifyTree, DecisionTree, DecisionTreeConfig, FeatureMode};
