//! Compilation of arena trees into [`RuntimeTree`]s.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    runtime::{NO_VALUE, RuntimeTree},
    tree::DecisionTree,
};

/// Flattens [`DecisionTree`]s into [`RuntimeTree`]s.
///
/// Ids are assigned in one breadth-first pass. Split values and distributions
/// are interned by exact bit pattern, so equal distributions share one pool
/// entry. The interning maps are cleared per tree and reused across calls.
#[derive(Debug, Default)]
pub struct TreeCompiler {
    value_ids: HashMap<u64, u32>,
    distribution_ids: HashMap<Vec<u64>, u32>,
}

impl TreeCompiler {
    /// Create a compiler with empty interning maps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `tree`. Classification results are identical to the input's.
    pub fn compile(&mut self, tree: &DecisionTree) -> RuntimeTree {
        self.value_ids.clear();
        self.distribution_ids.clear();

        let n = tree.n_nodes();
        let mut out = RuntimeTree {
            condition_codes: Vec::with_capacity(n),
            attribute_indices: Vec::with_capacity(n),
            value_indices: Vec::with_capacity(n),
            distribution_indices: Vec::with_capacity(n),
            branch_offsets: Vec::with_capacity(n + 1),
            branch_targets: Vec::with_capacity(n.saturating_sub(1)),
            values: Vec::new(),
            distributions: Vec::new(),
            n_classes: tree.n_classes,
        };

        // `order[id]` is the arena index of runtime node `id`.
        let mut order = vec![tree.root().index()];
        out.branch_offsets.push(0);
        let mut head = 0;
        while head < order.len() {
            let node = &tree.nodes[order[head]];

            match node.condition {
                Some(condition) => {
                    out.condition_codes.push(condition.comparison.code());
                    out.attribute_indices.push(condition.attribute.index() as u32);
                    let value_id = self.intern_value(&mut out.values, condition.value);
                    out.value_indices.push(value_id);
                }
                None => {
                    out.condition_codes.push(0);
                    out.attribute_indices.push(0);
                    out.value_indices.push(NO_VALUE);
                }
            }
            let distribution_id =
                self.intern_distribution(&mut out.distributions, &node.distribution);
            out.distribution_indices.push(distribution_id);

            for child in &node.branches {
                out.branch_targets.push(order.len() as u32);
                order.push(child.index());
            }
            out.branch_offsets.push(out.branch_targets.len() as u32);
            head += 1;
        }

        debug!(
            n_nodes = out.n_nodes(),
            n_values = out.values.len(),
            n_distributions = out.n_distributions(),
            "tree compiled"
        );
        out
    }

    fn intern_value(&mut self, pool: &mut Vec<f64>, value: f64) -> u32 {
        *self.value_ids.entry(value.to_bits()).or_insert_with(|| {
            pool.push(value);
            (pool.len() - 1) as u32
        })
    }

    fn intern_distribution(&mut self, pool: &mut Vec<f64>, distribution: &[f64]) -> u32 {
        let key: Vec<u64> = distribution.iter().map(|p| p.to_bits()).collect();
        let stride = distribution.len().max(1);
        *self.distribution_ids.entry(key).or_insert_with(|| {
            pool.extend_from_slice(distribution);
            (pool.len() / stride - 1) as u32
        })
    }
}
