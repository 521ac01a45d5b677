//! Per-column attribute typing.

use std::fmt;

use crate::error::ForestError;

/// Zero-based attribute (column) index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a single column participates in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AttributeKind {
    /// Ignored entirely.
    Inactive,
    /// Arbitrary real value, split with a binary threshold.
    Continuous,
    /// Category index in `0..n`, or `-1` for "not applicable".
    Categorical(usize),
}

impl AttributeKind {
    /// Decode the integer form: `-1` inactive, `0` continuous, `n > 0` categorical.
    ///
    /// Returns `None` for codes below `-1`.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(AttributeKind::Inactive),
            0 => Some(AttributeKind::Continuous),
            n if n > 0 => Some(AttributeKind::Categorical(n as usize)),
            _ => None,
        }
    }

    /// Encode back to the integer form used by the persisted model.
    ///
    /// Lossless for every kind held by an [`AttributeDescriptor`], which
    /// only admits category counts in `1..=i32::MAX`.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            AttributeKind::Inactive => -1,
            AttributeKind::Continuous => 0,
            AttributeKind::Categorical(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }

    /// Return `true` unless the attribute is inactive.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, AttributeKind::Inactive)
    }
}

/// Column typing for every attribute of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    kinds: Vec<AttributeKind>,
}

impl AttributeDescriptor {
    /// Build a descriptor from explicit kinds.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidCategoryCount`] for a categorical kind
    /// with zero categories or more than `i32::MAX`.
    pub fn new(kinds: Vec<AttributeKind>) -> Result<Self, ForestError> {
        for (attribute, kind) in kinds.iter().enumerate() {
            if let AttributeKind::Categorical(n) = *kind
                && (n == 0 || i32::try_from(n).is_err())
            {
                return Err(ForestError::InvalidCategoryCount {
                    attribute,
                    n_categories: n,
                });
            }
        }
        Ok(Self { kinds })
    }

    /// Build a descriptor from integer codes.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidDescriptorCode`] for any code below `-1`.
    pub fn from_codes(codes: &[i32]) -> Result<Self, ForestError> {
        let kinds = codes
            .iter()
            .enumerate()
            .map(|(attribute, &code)| {
                AttributeKind::from_code(code)
                    .ok_or(ForestError::InvalidDescriptorCode { attribute, code })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kinds })
    }

    /// Return the integer codes, one per attribute.
    #[must_use]
    pub fn codes(&self) -> Vec<i32> {
        self.kinds.iter().map(|k| k.code()).collect()
    }

    /// Return the kind of attribute `a`.
    ///
    /// # Panics
    ///
    /// Panics if `a` is out of range.
    #[must_use]
    pub fn kind(&self, a: AttributeIndex) -> AttributeKind {
        self.kinds[a.index()]
    }

    /// Return all kinds in column order.
    #[must_use]
    pub fn kinds(&self) -> &[AttributeKind] {
        &self.kinds
    }

    /// Return the number of attributes described.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Return `true` if the descriptor covers zero attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Return the indices of all non-inactive attributes, ascending.
    #[must_use]
    pub fn active_attributes(&self) -> Vec<AttributeIndex> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_active())
            .map(|(i, _)| AttributeIndex::new(i))
            .collect()
    }
}
