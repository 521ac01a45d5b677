//! Entropy, information gain, and best-split search.

use crate::attribute::{AttributeDescriptor, AttributeIndex, AttributeKind};
use crate::instance::InstanceSource;
use crate::node::{Comparison, Condition};

/// Above this many distinct values, continuous thresholds are chosen by
/// equal-count bucketing instead of at every midpoint.
pub const MAX_THRESHOLD_CANDIDATES: usize = 20;

/// Shannon entropy in bits of a class-count vector.
///
/// Returns `0.0` for an empty set; `0 · log2(0)` is taken as `0`.
#[must_use]
pub fn entropy(class_counts: &[usize]) -> f64 {
    let n: usize = class_counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    -class_counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Information gain of partitioning `parent_counts` into `branch_counts`.
///
/// `entropy(parent) - Σ (|branch| / |parent|) · entropy(branch)`. Instances
/// present in the parent but in no branch (missing categories) contribute
/// to the parent only. Clamped at zero against rounding noise.
#[must_use]
pub fn information_gain(parent_counts: &[usize], branch_counts: &[Vec<usize>]) -> f64 {
    let n: usize = parent_counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let remainder: f64 = branch_counts
        .iter()
        .map(|counts| {
            let size: usize = counts.iter().sum();
            (size as f64 / n) * entropy(counts)
        })
        .sum();
    (entropy(parent_counts) - remainder).max(0.0)
}

/// Per-class instance counts of `instances`.
pub(crate) fn class_counts<S: InstanceSource + ?Sized>(
    source: &S,
    instances: &[usize],
    n_classes: usize,
) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in instances {
        counts[source.class_of(i)] += 1;
    }
    counts
}

/// The chosen split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Attribute used for the split.
    pub(crate) attribute: AttributeIndex,
    /// Information gain of the split.
    pub(crate) gain: f64,
    /// One condition per branch, in evaluation order.
    pub(crate) conditions: Vec<Condition>,
    /// Instances routed into each branch, parallel to `conditions`.
    pub(crate) partitions: Vec<Vec<usize>>,
}

/// Candidate split of one attribute, before partitioning.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    Categorical { n_categories: usize },
    Threshold(f64),
}

/// Find the highest-gain split over `candidates`.
///
/// Attributes are evaluated in the given order and a later candidate must
/// have strictly higher gain to replace an earlier one. Returns `None` when
/// no attribute yields at least two non-empty branches.
pub(crate) fn find_best_split<S: InstanceSource + ?Sized>(
    source: &S,
    descriptor: &AttributeDescriptor,
    instances: &[usize],
    candidates: &[AttributeIndex],
    parent_counts: &[usize],
) -> Option<SplitResult> {
    let mut best: Option<(AttributeIndex, Candidate, f64)> = None;

    for &attribute in candidates {
        let evaluated = match descriptor.kind(attribute) {
            AttributeKind::Inactive => None,
            AttributeKind::Categorical(n_categories) => {
                evaluate_categorical(source, attribute, n_categories, instances, parent_counts)
                    .map(|gain| (Candidate::Categorical { n_categories }, gain))
            }
            AttributeKind::Continuous => {
                evaluate_continuous(source, attribute, instances, parent_counts)
                    .map(|(threshold, gain)| (Candidate::Threshold(threshold), gain))
            }
        };
        let Some((candidate, gain)) = evaluated else {
            continue;
        };
        if best.is_none_or(|(_, _, best_gain)| gain > best_gain) {
            best = Some((attribute, candidate, gain));
        }
    }

    let (attribute, candidate, gain) = best?;
    let (conditions, partitions) = partition(source, attribute, candidate, instances);
    Some(SplitResult {
        attribute,
        gain,
        conditions,
        partitions,
    })
}

/// Gain of a one-branch-per-category split, or `None` when fewer than two
/// categories are populated. Category `-1` joins no branch.
fn evaluate_categorical<S: InstanceSource + ?Sized>(
    source: &S,
    attribute: AttributeIndex,
    n_categories: usize,
    instances: &[usize],
    parent_counts: &[usize],
) -> Option<f64> {
    let n_classes = parent_counts.len();
    let mut branch_counts = vec![vec![0usize; n_classes]; n_categories];
    for &i in instances {
        let value = source.value_at(i, attribute.index());
        if value >= 0.0 {
            branch_counts[value as usize][source.class_of(i)] += 1;
        }
    }

    let populated = branch_counts
        .iter()
        .filter(|counts| counts.iter().any(|&c| c > 0))
        .count();
    if populated < 2 {
        return None;
    }
    Some(information_gain(parent_counts, &branch_counts))
}

/// Best `(threshold, gain)` of a binary `< t` / `>= t` split, or `None` when
/// the attribute is constant over `instances`.
fn evaluate_continuous<S: InstanceSource + ?Sized>(
    source: &S,
    attribute: AttributeIndex,
    instances: &[usize],
    parent_counts: &[usize],
) -> Option<(f64, f64)> {
    let n_classes = parent_counts.len();
    let mut sorted: Vec<(f64, usize)> = instances
        .iter()
        .map(|&i| (source.value_at(i, attribute.index()), source.class_of(i)))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Runs of equal values: (value, exclusive end position in `sorted`).
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for (pos, &(value, _)) in sorted.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.0 == value => run.1 = pos + 1,
            _ => runs.push((value, pos + 1)),
        }
    }
    if runs.len() < 2 {
        return None;
    }

    let run_sizes: Vec<usize> = runs
        .iter()
        .scan(0usize, |start, &(_, end)| {
            let size = end - *start;
            *start = end;
            Some(size)
        })
        .collect();
    let boundaries = threshold_boundaries(&run_sizes, sorted.len());

    let mut left = vec![0usize; n_classes];
    let mut consumed = 0usize;
    let mut best: Option<(f64, f64)> = None;
    for boundary in boundaries {
        let end = runs[boundary].1;
        for &(_, class) in &sorted[consumed..end] {
            left[class] += 1;
        }
        consumed = end;

        let right: Vec<usize> = parent_counts
            .iter()
            .zip(&left)
            .map(|(&p, &l)| p - l)
            .collect();
        let gain = information_gain(parent_counts, &[left.clone(), right]);
        if best.is_none_or(|(_, best_gain)| gain > best_gain) {
            best = Some((midpoint(runs[boundary].0, runs[boundary + 1].0), gain));
        }
    }
    best
}

/// Indices `j` of the runs after which a threshold is tried.
///
/// With at most [`MAX_THRESHOLD_CANDIDATES`] distinct values every gap is a
/// candidate. Otherwise a gap is taken each time the cumulative count first
/// reaches the next multiple of `total / MAX_THRESHOLD_CANDIDATES`, which
/// buckets the instances into roughly equal-count groups.
pub(crate) fn threshold_boundaries(run_sizes: &[usize], total: usize) -> Vec<usize> {
    let n_gaps = run_sizes.len().saturating_sub(1);
    if run_sizes.len() <= MAX_THRESHOLD_CANDIDATES {
        return (0..n_gaps).collect();
    }

    let step = total as f64 / MAX_THRESHOLD_CANDIDATES as f64;
    let mut next = step;
    let mut cumulative = 0usize;
    let mut boundaries = Vec::with_capacity(MAX_THRESHOLD_CANDIDATES);
    for (j, &size) in run_sizes.iter().take(n_gaps).enumerate() {
        cumulative += size;
        if cumulative as f64 >= next {
            boundaries.push(j);
            while next <= cumulative as f64 {
                next += step;
            }
        }
    }
    // A dominant final run can hold every bucket target.
    if boundaries.is_empty() {
        boundaries.push(n_gaps - 1);
    }
    boundaries
}

/// Threshold strictly above `lo` and at most `hi`, so `< t` keeps `lo` on the
/// lower side and sends `hi` to the upper side.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid > lo && mid <= hi { mid } else { hi }
}

fn partition<S: InstanceSource + ?Sized>(
    source: &S,
    attribute: AttributeIndex,
    candidate: Candidate,
    instances: &[usize],
) -> (Vec<Condition>, Vec<Vec<usize>>) {
    let a = attribute.index();
    match candidate {
        Candidate::Categorical { n_categories } => {
            let mut partitions = vec![Vec::new(); n_categories];
            for &i in instances {
                let value = source.value_at(i, a);
                if value >= 0.0 {
                    partitions[value as usize].push(i);
                }
            }
            let conditions = (0..n_categories)
                .map(|c| Condition {
                    attribute,
                    comparison: Comparison::Equal,
                    value: c as f64,
                })
                .collect();
            (conditions, partitions)
        }
        Candidate::Threshold(threshold) => {
            let (lower, upper): (Vec<usize>, Vec<usize>) = instances
                .iter()
                .copied()
                .partition(|&i| source.value_at(i, a) < threshold);
            let conditions = vec![
                Condition {
                    attribute,
                    comparison: Comparison::Less,
                    value: threshold,
                },
                Condition {
                    attribute,
                    comparison: Comparison::GreaterOrEqual,
                    value: threshold,
                },
            ];
            (conditions, vec![lower, upper])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::DenseInstances;

    fn all(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn entropy_pure_is_zero() {
        assert_eq!(entropy(&[10, 0, 0]), 0.0);
    }

    #[test]
    fn entropy_balanced_binary_is_one_bit() {
        assert!((entropy(&[5, 5]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_uniform_four_classes_is_two_bits() {
        assert!((entropy(&[3, 3, 3, 3]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_empty_is_zero() {
        assert_eq!(entropy(&[0, 0]), 0.0);
    }

    #[test]
    fn perfect_split_gains_full_entropy() {
        let gain = information_gain(&[2, 2], &[vec![2, 0], vec![0, 2]]);
        assert!((gain - 1.0).abs() < 1e-12);
    }

    #[test]
    fn uninformative_split_gains_nothing() {
        let gain = information_gain(&[4, 4], &[vec![2, 2], vec![2, 2]]);
        assert!(gain.abs() < 1e-12);
        assert!(gain >= 0.0);
    }

    #[test]
    fn gain_non_negative_with_missing_instances() {
        // 90 instances missing the attribute, 10 spread over two mixed branches.
        let gain = information_gain(&[90, 5, 5], &[vec![0, 3, 2], vec![0, 2, 3]]);
        assert!(gain >= 0.0);
    }

    #[test]
    fn boundaries_every_gap_at_cap() {
        let sizes = vec![1; MAX_THRESHOLD_CANDIDATES];
        assert_eq!(
            threshold_boundaries(&sizes, MAX_THRESHOLD_CANDIDATES),
            (0..MAX_THRESHOLD_CANDIDATES - 1).collect::<Vec<_>>()
        );
    }

    #[test]
    fn boundaries_bucketed_above_cap() {
        let sizes = vec![1; 1000];
        let boundaries = threshold_boundaries(&sizes, 1000);
        assert_eq!(boundaries.len(), MAX_THRESHOLD_CANDIDATES - 1);
        assert_eq!(boundaries[0], 49);
        assert_eq!(boundaries[1], 99);
        assert!(boundaries.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn boundaries_skip_heavy_runs() {
        // One dominant value swallows several bucket targets at once.
        let mut sizes = vec![1; 30];
        sizes[0] = 70;
        let boundaries = threshold_boundaries(&sizes, 99);
        assert_eq!(boundaries[0], 0);
        assert!(boundaries.len() < MAX_THRESHOLD_CANDIDATES);
    }

    #[test]
    fn boundaries_fall_back_before_dominant_last_run() {
        let mut sizes = vec![1; 25];
        sizes[24] = 1000;
        assert_eq!(threshold_boundaries(&sizes, 1024), vec![23]);
    }

    #[test]
    fn midpoint_stays_in_half_open_gap() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        let lo = 1.0f64;
        let hi = f64::from_bits(lo.to_bits() + 1);
        let t = midpoint(lo, hi);
        assert!(t > lo && t <= hi);
    }

    #[test]
    fn continuous_split_at_midpoint() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 0, 0, 1, 1, 1]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[0]).unwrap();
        let parent = class_counts(&data, &all(6), 2);
        let split = find_best_split(
            &data,
            &descriptor,
            &all(6),
            &[AttributeIndex::new(0)],
            &parent,
        )
        .expect("split");
        assert_eq!(split.conditions[0].value, 6.5);
        assert_eq!(split.partitions, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert!((split.gain - 1.0).abs() < 1e-12);
    }

    #[test]
    fn continuous_tie_keeps_first_threshold() {
        // Thresholds 1.5 and 3.5 both isolate one pure instance; 1.5 comes first.
        let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 1, 1, 0]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[0]).unwrap();
        let parent = class_counts(&data, &all(4), 2);
        let split = find_best_split(
            &data,
            &descriptor,
            &all(4),
            &[AttributeIndex::new(0)],
            &parent,
        )
        .unwrap();
        assert_eq!(split.conditions[0].value, 1.5);
    }

    #[test]
    fn attribute_tie_keeps_first_attribute() {
        let rows = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 0, 1, 1]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[2, 2]).unwrap();
        let parent = class_counts(&data, &all(4), 2);
        let candidates = [AttributeIndex::new(1), AttributeIndex::new(0)];
        let split = find_best_split(&data, &descriptor, &all(4), &candidates, &parent).unwrap();
        assert_eq!(split.attribute.index(), 1);
    }

    #[test]
    fn categorical_split_drops_missing() {
        let rows = vec![vec![0.0], vec![-1.0], vec![1.0], vec![2.0], vec![0.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 1, 1, 0, 0]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[3]).unwrap();
        let parent = class_counts(&data, &all(5), 2);
        let split = find_best_split(
            &data,
            &descriptor,
            &all(5),
            &[AttributeIndex::new(0)],
            &parent,
        )
        .unwrap();
        assert_eq!(split.conditions.len(), 3);
        assert_eq!(split.partitions, vec![vec![0, 4], vec![2], vec![3]]);
    }

    #[test]
    fn single_populated_category_is_not_a_split() {
        let rows = vec![vec![1.0], vec![1.0], vec![-1.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 1, 1]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[2]).unwrap();
        let parent = class_counts(&data, &all(3), 2);
        assert!(
            find_best_split(&data, &descriptor, &all(3), &[AttributeIndex::new(0)], &parent)
                .is_none()
        );
    }

    #[test]
    fn constant_continuous_is_not_a_split() {
        let rows = vec![vec![5.0], vec![5.0], vec![5.0]];
        let data = DenseInstances::from_rows(&rows, vec![0, 1, 1]).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[0]).unwrap();
        let parent = class_counts(&data, &all(3), 2);
        assert!(
            find_best_split(&data, &descriptor, &all(3), &[AttributeIndex::new(0)], &parent)
                .is_none()
        );
    }

    #[test]
    fn high_cardinality_split_still_separates() {
        let rows: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64]).collect();
        let classes: Vec<usize> = (0..200).map(|i| usize::from(i >= 100)).collect();
        let data = DenseInstances::from_rows(&rows, classes).unwrap();
        let descriptor = AttributeDescriptor::from_codes(&[0]).unwrap();
        let parent = class_counts(&data, &all(200), 2);
        let split = find_best_split(
            &data,
            &descriptor,
            &all(200),
            &[AttributeIndex::new(0)],
            &parent,
        )
        .unwrap();
        assert_eq!(split.conditions[0].value, 99.5);
        assert_eq!(split.partitions[0].len(), 100);
    }
}
