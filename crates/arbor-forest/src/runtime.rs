//! Flat, index-addressed decision tree used for classification and persistence.

use crate::{ForestError, node::Comparison, tree::ClassifyTree};

/// Value-pool index stored for the root, which has no condition.
pub const NO_VALUE: u32 = u32::MAX;

/// A compiled decision tree stored as parallel arrays.
///
/// Node ids are breadth-first: the root is 0, the children of one node occupy
/// a contiguous id range, and every child id is greater than its parent's.
/// Child lists are kept in CSR form: the children of node `n` are
/// `branch_targets[branch_offsets[n]..branch_offsets[n + 1]]`.
///
/// Split values and class distributions are interned into per-tree pools;
/// distributions are stored flat with a stride of `n_classes`. Pools are not
/// shared between the trees of a forest, so pool indices only have meaning
/// within the tree that holds them.
///
/// Field order is the persisted layout; the class count is restored from the
/// model header on load.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeTree {
    pub(crate) condition_codes: Vec<u8>,
    pub(crate) attribute_indices: Vec<u32>,
    pub(crate) value_indices: Vec<u32>,
    pub(crate) distribution_indices: Vec<u32>,
    pub(crate) branch_offsets: Vec<u32>,
    pub(crate) branch_targets: Vec<u32>,
    pub(crate) values: Vec<f64>,
    pub(crate) distributions: Vec<f64>,
    #[serde(skip)]
    pub(crate) n_classes: usize,
}

fn malformed(reason: String) -> ForestError {
    ForestError::MalformedModel { reason }
}

impl RuntimeTree {
    /// Return the number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.condition_codes.len()
    }

    /// Return the number of nodes without children.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.branch_offsets
            .windows(2)
            .filter(|w| w[0] == w[1])
            .count()
    }

    /// Return the per-node condition codes (0 = none, see [`Comparison::code`]).
    #[must_use]
    pub fn condition_codes(&self) -> &[u8] {
        &self.condition_codes
    }

    /// Return the per-node attribute indices.
    #[must_use]
    pub fn attribute_indices(&self) -> &[u32] {
        &self.attribute_indices
    }

    /// Return the per-node value-pool indices ([`NO_VALUE`] for the root).
    #[must_use]
    pub fn value_indices(&self) -> &[u32] {
        &self.value_indices
    }

    /// Return the per-node distribution-pool indices.
    #[must_use]
    pub fn distribution_indices(&self) -> &[u32] {
        &self.distribution_indices
    }

    /// Return the CSR offsets into [`RuntimeTree::branch_targets`] (`n_nodes + 1` entries).
    #[must_use]
    pub fn branch_offsets(&self) -> &[u32] {
        &self.branch_offsets
    }

    /// Return the concatenated child id lists.
    #[must_use]
    pub fn branch_targets(&self) -> &[u32] {
        &self.branch_targets
    }

    /// Return the pool of distinct split values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the number of distinct distributions in the pool.
    #[must_use]
    pub fn n_distributions(&self) -> usize {
        self.distributions.len() / self.n_classes
    }

    /// Return the child ids of `node`, in evaluation order.
    ///
    /// # Panics
    ///
    /// Panics if `node >= n_nodes()`.
    #[must_use]
    pub fn children(&self, node: usize) -> &[u32] {
        let start = self.branch_offsets[node] as usize;
        let end = self.branch_offsets[node + 1] as usize;
        &self.branch_targets[start..end]
    }

    /// Return the class distribution of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node >= n_nodes()`.
    #[must_use]
    pub fn distribution(&self, node: usize) -> &[f64] {
        let start = self.distribution_indices[node] as usize * self.n_classes;
        &self.distributions[start..start + self.n_classes]
    }

    #[inline]
    fn matches(&self, node: usize, row: &[f64]) -> bool {
        let Some(comparison) = Comparison::from_code(self.condition_codes[node]) else {
            return false;
        };
        let value = row[self.attribute_indices[node] as usize];
        comparison.test(value, self.values[self.value_indices[node] as usize])
    }

    /// Check every structural invariant that traversal relies on.
    ///
    /// Called on every deserialized tree, so that classification of a loaded
    /// model can index the arrays without bounds surprises.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedModel`] describing the first violation.
    pub fn validate(&self, n_attributes: usize) -> Result<(), ForestError> {
        let n = self.n_nodes();
        if n == 0 {
            return Err(malformed("tree has no nodes".into()));
        }
        if self.n_classes == 0 {
            return Err(malformed("tree has zero classes".into()));
        }
        for (name, len) in [
            ("attribute indices", self.attribute_indices.len()),
            ("value indices", self.value_indices.len()),
            ("distribution indices", self.distribution_indices.len()),
        ] {
            if len != n {
                return Err(malformed(format!("{name} has {len} entries for {n} nodes")));
            }
        }
        if self.branch_offsets.len() != n + 1 {
            return Err(malformed(format!(
                "branch offsets have {} entries for {n} nodes",
                self.branch_offsets.len()
            )));
        }
        if self.branch_offsets[0] != 0
            || self.branch_offsets.windows(2).any(|w| w[0] > w[1])
            || self.branch_offsets[n] as usize != self.branch_targets.len()
        {
            return Err(malformed("branch offsets are not a valid partition".into()));
        }
        if self.distributions.len() % self.n_classes != 0 {
            return Err(malformed(format!(
                "distribution pool length {} is not a multiple of {} classes",
                self.distributions.len(),
                self.n_classes
            )));
        }
        let n_distributions = self.n_distributions();

        for node in 0..n {
            let code = self.condition_codes[node];
            if node == 0 {
                if code != 0 {
                    return Err(malformed(format!("root has condition code {code}")));
                }
            } else {
                if Comparison::from_code(code).is_none() {
                    return Err(malformed(format!("node {node} has condition code {code}")));
                }
                let attribute = self.attribute_indices[node] as usize;
                if attribute >= n_attributes {
                    return Err(malformed(format!(
                        "node {node} reads attribute {attribute} of {n_attributes}"
                    )));
                }
                if self.value_indices[node] as usize >= self.values.len() {
                    return Err(malformed(format!("node {node} value index out of range")));
                }
            }
            if self.distribution_indices[node] as usize >= n_distributions {
                return Err(malformed(format!(
                    "node {node} distribution index out of range"
                )));
            }
            for &child in self.children(node) {
                let child = child as usize;
                if child <= node || child >= n {
                    return Err(malformed(format!("node {node} has invalid child {child}")));
                }
            }
        }
        Ok(())
    }
}

impl ClassifyTree for RuntimeTree {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn resolve(&self, row: &[f64]) -> Option<&[f64]> {
        if self.condition_codes.is_empty() {
            return None;
        }
        let mut node = 0usize;
        'descend: loop {
            for &child in self.children(node) {
                let child = child as usize;
                if self.matches(child, row) {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(self.distribution(node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root splits a0 < 0.5 / a0 >= 0.5; both children are leaves.
    fn stump() -> RuntimeTree {
        RuntimeTree {
            condition_codes: vec![0, 2, 3],
            attribute_indices: vec![0, 0, 0],
            value_indices: vec![NO_VALUE, 0, 0],
            distribution_indices: vec![0, 1, 2],
            branch_offsets: vec![0, 2, 2, 2],
            branch_targets: vec![1, 2],
            values: vec![0.5],
            distributions: vec![0.5, 0.5, 1.0, 0.0, 0.0, 1.0],
            n_classes: 2,
        }
    }

    #[test]
    fn stump_classifies() {
        let tree = stump();
        assert!(tree.validate(1).is_ok());
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.n_distributions(), 3);
        let mut buffer = [0.0; 2];
        assert_eq!(tree.classify(&[0.1], Some(&mut buffer)), Some(0));
        assert_eq!(buffer, [1.0, 0.0]);
        assert_eq!(tree.classify(&[0.5], None), Some(1));
        // NaN matches no branch and stops at the root.
        assert_eq!(tree.classify(&[f64::NAN], Some(&mut buffer)), Some(0));
        assert_eq!(buffer, [0.5, 0.5]);
    }

    #[test]
    fn empty_tree_abstains() {
        let tree = RuntimeTree {
            condition_codes: vec![],
            attribute_indices: vec![],
            value_indices: vec![],
            distribution_indices: vec![],
            branch_offsets: vec![0],
            branch_targets: vec![],
            values: vec![],
            distributions: vec![],
            n_classes: 2,
        };
        assert_eq!(tree.classify(&[0.0], None), None);
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn validate_rejects_backward_child() {
        let mut tree = stump();
        tree.branch_targets = vec![1, 0];
        assert!(matches!(
            tree.validate(1),
            Err(ForestError::MalformedModel { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_condition_code() {
        let mut tree = stump();
        tree.condition_codes[2] = 9;
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn validate_rejects_attribute_out_of_range() {
        let tree = stump();
        assert!(tree.validate(0).is_err());
    }

    #[test]
    fn validate_rejects_dangling_indices() {
        let mut tree = stump();
        tree.distribution_indices[1] = 3;
        assert!(tree.validate(1).is_err());

        let mut tree = stump();
        tree.value_indices[1] = 1;
        assert!(tree.validate(1).is_err());

        let mut tree = stump();
        tree.branch_offsets = vec![0, 2, 2];
        assert!(tree.validate(1).is_err());
    }
}
