//! Read-only access to training instances.
//!
//! The tree builder only ever sees an [`InstanceSource`]. Three backings are
//! provided: [`DenseInstances`] (row-major `f64`), [`NarrowInstances`]
//! (row-major `f32`), and [`PackedInstances`] (bit-packed categorical data).

use std::borrow::Cow;

use crate::attribute::{AttributeDescriptor, AttributeKind};
use crate::error::ForestError;

/// Minimal data-access contract consumed by training.
///
/// Categorical columns hold a category index or `-1`; continuous columns
/// hold an arbitrary real value.
pub trait InstanceSource {
    /// Number of instances.
    fn instance_count(&self) -> usize;

    /// Number of attributes per instance.
    fn attribute_count(&self) -> usize;

    /// Value of attribute `attribute` for instance `instance`.
    fn value_at(&self, instance: usize, attribute: usize) -> f64;

    /// True class label of `instance`, in `[0, n_classes)`.
    fn class_of(&self, instance: usize) -> usize;

    /// Full attribute row of `instance`.
    fn row_at(&self, instance: usize) -> Cow<'_, [f64]> {
        Cow::Owned(
            (0..self.attribute_count())
                .map(|a| self.value_at(instance, a))
                .collect(),
        )
    }
}

/// Dense row-major `f64` storage.
#[derive(Debug, Clone)]
pub struct DenseInstances {
    values: Vec<f64>,
    n_attributes: usize,
    classes: Vec<usize>,
}

impl DenseInstances {
    /// Wrap a flat row-major value buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::StorageShapeMismatch`] | `values.len() != classes.len() * n_attributes` |
    pub fn new(
        values: Vec<f64>,
        n_attributes: usize,
        classes: Vec<usize>,
    ) -> Result<Self, ForestError> {
        let expected = classes.len() * n_attributes;
        if values.len() != expected {
            return Err(ForestError::StorageShapeMismatch {
                expected,
                values: values.len(),
            });
        }
        Ok(Self {
            values,
            n_attributes,
            classes,
        })
    }

    /// Build from one `Vec` per instance.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ClassCountMismatch`] | `rows.len() != classes.len()` |
    /// | [`ForestError::RaggedRow`] | rows have inconsistent lengths |
    pub fn from_rows(rows: &[Vec<f64>], classes: Vec<usize>) -> Result<Self, ForestError> {
        if rows.len() != classes.len() {
            return Err(ForestError::ClassCountMismatch {
                instances: rows.len(),
                classes: classes.len(),
            });
        }
        let n_attributes = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * n_attributes);
        for (instance, row) in rows.iter().enumerate() {
            if row.len() != n_attributes {
                return Err(ForestError::RaggedRow {
                    instance,
                    expected: n_attributes,
                    got: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::new(values, n_attributes, classes)
    }

    /// Return the class labels in instance order.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }
}

impl InstanceSource for DenseInstances {
    fn instance_count(&self) -> usize {
        self.classes.len()
    }

    fn attribute_count(&self) -> usize {
        self.n_attributes
    }

    fn value_at(&self, instance: usize, attribute: usize) -> f64 {
        self.values[instance * self.n_attributes + attribute]
    }

    fn class_of(&self, instance: usize) -> usize {
        self.classes[instance]
    }

    fn row_at(&self, instance: usize) -> Cow<'_, [f64]> {
        let start = instance * self.n_attributes;
        Cow::Borrowed(&self.values[start..start + self.n_attributes])
    }
}

/// Row-major `f32` storage with `u16` class labels, half the footprint of
/// [`DenseInstances`].
#[derive(Debug, Clone)]
pub struct NarrowInstances {
    values: Vec<f32>,
    n_attributes: usize,
    classes: Vec<u16>,
}

impl NarrowInstances {
    /// Wrap a flat row-major `f32` buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::StorageShapeMismatch`] | `values.len() != classes.len() * n_attributes` |
    pub fn new(
        values: Vec<f32>,
        n_attributes: usize,
        classes: Vec<u16>,
    ) -> Result<Self, ForestError> {
        let expected = classes.len() * n_attributes;
        if values.len() != expected {
            return Err(ForestError::StorageShapeMismatch {
                expected,
                values: values.len(),
            });
        }
        Ok(Self {
            values,
            n_attributes,
            classes,
        })
    }
}

impl InstanceSource for NarrowInstances {
    fn instance_count(&self) -> usize {
        self.classes.len()
    }

    fn attribute_count(&self) -> usize {
        self.n_attributes
    }

    fn value_at(&self, instance: usize, attribute: usize) -> f64 {
        f64::from(self.values[instance * self.n_attributes + attribute])
    }

    fn class_of(&self, instance: usize) -> usize {
        usize::from(self.classes[instance])
    }
}

/// Bit-packed storage for all-categorical data.
///
/// Each categorical column with `k` categories takes `bits(k)` bits per
/// instance and stores `value + 1`, so the `-1` sentinel packs as zero.
/// Inactive columns take no bits and read back as `-1`.
#[derive(Debug, Clone)]
pub struct PackedInstances {
    words: Vec<u64>,
    offsets: Vec<usize>,
    widths: Vec<u32>,
    row_bits: usize,
    classes: Vec<u32>,
}

impl PackedInstances {
    /// Pack categorical rows according to `descriptor`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ClassCountMismatch`] | `rows.len() != classes.len()` |
    /// | [`ForestError::RaggedRow`] | a row length differs from the descriptor |
    /// | [`ForestError::UnpackableAttribute`] | the descriptor has a continuous column |
    /// | [`ForestError::InvalidCategory`] | a value is not an integer in `[-1, k)` |
    /// | [`ForestError::ClassOutOfRange`] | a class label does not fit in `u32` |
    pub fn from_rows(
        descriptor: &AttributeDescriptor,
        rows: &[Vec<f64>],
        classes: &[usize],
    ) -> Result<Self, ForestError> {
        if rows.len() != classes.len() {
            return Err(ForestError::ClassCountMismatch {
                instances: rows.len(),
                classes: classes.len(),
            });
        }

        let mut widths = Vec::with_capacity(descriptor.len());
        let mut offsets = Vec::with_capacity(descriptor.len());
        let mut row_bits = 0usize;
        for (attribute, kind) in descriptor.kinds().iter().enumerate() {
            let width = match *kind {
                AttributeKind::Inactive => 0,
                AttributeKind::Continuous => {
                    return Err(ForestError::UnpackableAttribute { attribute });
                }
                AttributeKind::Categorical(k) => u64::BITS - (k as u64).leading_zeros(),
            };
            offsets.push(row_bits);
            widths.push(width);
            row_bits += width as usize;
        }

        let classes = classes
            .iter()
            .enumerate()
            .map(|(index, &class)| {
                u32::try_from(class).map_err(|_| ForestError::ClassOutOfRange {
                    index,
                    class,
                    limit: u64::from(u32::MAX) + 1,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_bits = row_bits * rows.len();
        let mut packed = Self {
            words: vec![0; total_bits.div_ceil(64)],
            offsets,
            widths,
            row_bits,
            classes,
        };

        for (instance, row) in rows.iter().enumerate() {
            if row.len() != descriptor.len() {
                return Err(ForestError::RaggedRow {
                    instance,
                    expected: descriptor.len(),
                    got: row.len(),
                });
            }
            for (attribute, kind) in descriptor.kinds().iter().enumerate() {
                let AttributeKind::Categorical(k) = *kind else {
                    continue;
                };
                let value = row[attribute];
                if !is_category(value, k) {
                    return Err(ForestError::InvalidCategory {
                        instance,
                        attribute,
                        value,
                        n_categories: k,
                    });
                }
                let start = instance * packed.row_bits + packed.offsets[attribute];
                packed.put(start, packed.widths[attribute], (value + 1.0) as u64);
            }
        }

        Ok(packed)
    }

    /// Return the number of 64-bit words backing the packed values.
    #[must_use]
    pub fn n_words(&self) -> usize {
        self.words.len()
    }

    fn put(&mut self, bit: usize, width: u32, value: u64) {
        let word = bit / 64;
        let shift = (bit % 64) as u32;
        self.words[word] |= value << shift;
        if shift + width > 64 {
            self.words[word + 1] |= value >> (64 - shift);
        }
    }

    fn get(&self, bit: usize, width: u32) -> u64 {
        let word = bit / 64;
        let shift = (bit % 64) as u32;
        let mut value = self.words[word] >> shift;
        if shift + width > 64 {
            value |= self.words[word + 1] << (64 - shift);
        }
        if width == 64 {
            value
        } else {
            value & ((1u64 << width) - 1)
        }
    }
}

impl InstanceSource for PackedInstances {
    fn instance_count(&self) -> usize {
        self.classes.len()
    }

    fn attribute_count(&self) -> usize {
        self.widths.len()
    }

    fn value_at(&self, instance: usize, attribute: usize) -> f64 {
        let width = self.widths[attribute];
        if width == 0 {
            return -1.0;
        }
        let bit = instance * self.row_bits + self.offsets[attribute];
        self.get(bit, width) as f64 - 1.0
    }

    fn class_of(&self, instance: usize) -> usize {
        self.classes[instance] as usize
    }
}

/// Return `true` if `value` is `-1` or an integer in `[0, k)`.
pub(crate) fn is_category(value: f64, k: usize) -> bool {
    value == -1.0 || (value >= 0.0 && value.fract() == 0.0 && value < k as f64)
}

/// Validate `source` against `descriptor` and derive the class count.
///
/// Every active value is checked before any tree is grown so training never
/// fails half-way.
pub(crate) fn validate_training<S: InstanceSource + ?Sized>(
    source: &S,
    descriptor: &AttributeDescriptor,
) -> Result<usize, ForestError> {
    let n_instances = source.instance_count();
    if n_instances == 0 {
        return Err(ForestError::EmptyDataset);
    }
    if descriptor.len() != source.attribute_count() {
        return Err(ForestError::DescriptorMismatch {
            descriptor: descriptor.len(),
            attributes: source.attribute_count(),
        });
    }

    let mut max_class = 0usize;
    for instance in 0..n_instances {
        max_class = max_class.max(source.class_of(instance));
        for (attribute, kind) in descriptor.kinds().iter().enumerate() {
            let value = source.value_at(instance, attribute);
            match *kind {
                AttributeKind::Inactive => {}
                AttributeKind::Continuous => {
                    if !value.is_finite() {
                        return Err(ForestError::NonFiniteValue {
                            instance,
                            attribute,
                        });
                    }
                }
                AttributeKind::Categorical(k) => {
                    if !is_category(value, k) {
                        return Err(ForestError::InvalidCategory {
                            instance,
                            attribute,
                            value,
                            n_categories: k,
                        });
                    }
                }
            }
        }
    }

    Ok(max_class + 1)
}
