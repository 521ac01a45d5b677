use std::fmt;

use crate::attribute::AttributeIndex;

/// Index into a `Vec<Node>` arena, identifying a node of a [`DecisionTree`](crate::DecisionTree).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comparison operator of a branch condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Comparison {
    /// Categorical branch: `value == category`.
    Equal,
    /// Continuous lower branch: `value < threshold`.
    Less,
    /// Continuous upper branch: `value >= threshold`.
    GreaterOrEqual,
}

impl Comparison {
    /// Code stored in runtime trees. `0` is reserved for "no condition".
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Comparison::Equal => 1,
            Comparison::Less => 2,
            Comparison::GreaterOrEqual => 3,
        }
    }

    /// Inverse of [`Comparison::code`]; `None` for `0` and unknown codes.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Comparison::Equal),
            2 => Some(Comparison::Less),
            3 => Some(Comparison::GreaterOrEqual),
            _ => None,
        }
    }

    /// Apply the operator to `value` against `operand`.
    ///
    /// NaN never matches, so a NaN value stops traversal at the parent.
    #[inline]
    #[must_use]
    pub fn test(self, value: f64, operand: f64) -> bool {
        match self {
            Comparison::Equal => value == operand,
            Comparison::Less => value < operand,
            Comparison::GreaterOrEqual => value >= operand,
        }
    }
}

/// The condition an instance must satisfy to enter a branch.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Condition {
    /// Attribute the condition reads.
    pub attribute: AttributeIndex,
    /// Operator applied to the attribute value.
    pub comparison: Comparison,
    /// Category index or threshold.
    pub value: f64,
}

impl Condition {
    /// Return `true` if `row` satisfies the condition.
    #[inline]
    #[must_use]
    pub fn matches(&self, row: &[f64]) -> bool {
        self.comparison.test(row[self.attribute.index()], self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::Equal => "==",
            Comparison::Less => "<",
            Comparison::GreaterOrEqual => ">=",
        };
        write!(f, "a{} {op} {}", self.attribute, self.value)
    }
}

/// A node of a training-time decision tree arena.
///
/// The root carries no condition; every other node carries the condition of
/// the branch leading to it. A node with no branches is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Condition of the branch entering this node (`None` for the root).
    pub condition: Option<Condition>,
    /// Relative class frequencies of the instances reaching this node.
    pub distribution: Vec<f64>,
    /// Child branches, evaluated in order.
    pub branches: Vec<NodeIndex>,
    /// Number of training instances that reached this node.
    pub n_instances: usize,
}

impl Node {
    /// Return `true` if this node has no branches.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Index of the first maximum of `values` (lowest class index on ties).
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
