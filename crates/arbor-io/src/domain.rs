//! Domain types for arbor-io.

use arbor_forest::DenseInstances;

use crate::IoError;
use crate::schema::Schema;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded CSV rows together with the schema that encoded them.
///
/// Produced by [`InstanceReader`](crate::InstanceReader). `rows[i]` holds one
/// value per schema column and, when labels were present, `classes[i]` is its
/// class index into [`Schema::classes`].
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<f64>>,
    classes: Option<Vec<usize>>,
}

impl Dataset {
    pub(crate) fn new(schema: Schema, rows: Vec<Vec<f64>>, classes: Option<Vec<usize>>) -> Self {
        Self {
            schema,
            rows,
            classes,
        }
    }

    /// Return the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the encoded rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the class indices, if the data was labelled.
    #[must_use]
    pub fn classes(&self) -> Option<&[usize]> {
        self.classes.as_deref()
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Copy the labelled rows into training storage.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Unlabeled`] | the data has no class column |
    /// | [`IoError::Forest`] | the rows cannot form instance storage |
    pub fn to_instances(&self) -> Result<DenseInstances, IoError> {
        let classes = self.classes.clone().ok_or(IoError::Unlabeled)?;
        Ok(DenseInstances::from_rows(&self.rows, classes)?)
    }
}
