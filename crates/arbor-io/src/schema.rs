//! Column typing for CSV data and its JSON persistence.

use std::fs;
use std::path::Path;

use arbor_forest::{AttributeDescriptor, AttributeKind, Forest};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::IoError;

/// Return `true` for cells that mean "value not available": empty or `?`.
pub(crate) fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == "?"
}

/// How a column is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Ignored for training; always encoded as `-1`.
    Inactive,
    /// Real-valued column, parsed as `f64`.
    Continuous,
    /// Nominal column; a cell is encoded as its index in `categories`, and
    /// missing or unseen cells as `-1`.
    Categorical {
        /// Category labels in index order.
        categories: Vec<String>,
    },
}

/// One attribute column of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Header name.
    pub name: String,
    /// Encoding of the column.
    pub kind: ColumnKind,
}

impl Column {
    /// Encode one cell; `None` for a continuous cell that is not a finite number.
    pub(crate) fn encode(&self, cell: &str) -> Option<f64> {
        match &self.kind {
            ColumnKind::Inactive => Some(-1.0),
            ColumnKind::Continuous => cell.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            ColumnKind::Categorical { categories } => {
                let cell = cell.trim();
                Some(
                    categories
                        .iter()
                        .position(|c| c == cell)
                        .map_or(-1.0, |i| i as f64),
                )
            }
        }
    }
}

/// Column names, encodings, and class labels of a dataset.
///
/// Inferred by [`InstanceReader::read`](crate::InstanceReader::read) and
/// saved next to a trained model so new data is encoded identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    class_column: String,
    columns: Vec<Column>,
    classes: Vec<String>,
}

impl Schema {
    pub(crate) fn new(class_column: String, columns: Vec<Column>, classes: Vec<String>) -> Self {
        Self {
            class_column,
            columns,
            classes,
        }
    }

    /// Return the name of the class column.
    #[must_use]
    pub fn class_column(&self) -> &str {
        &self.class_column
    }

    /// Return the attribute columns in encoding order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return the class labels in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the label of class `index`, if it exists.
    #[must_use]
    pub fn class_name(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Return the index of class `label`, if it exists.
    #[must_use]
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// Return the number of attribute columns.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    /// Build the attribute descriptor used for training.
    ///
    /// A categorical column without categories carries no information and is
    /// reported as inactive.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Forest`] if a column has more categories than the
    /// model format can record.
    pub fn descriptor(&self) -> Result<AttributeDescriptor, IoError> {
        let kinds = self
            .columns
            .iter()
            .map(|column| match &column.kind {
                ColumnKind::Inactive => AttributeKind::Inactive,
                ColumnKind::Continuous => AttributeKind::Continuous,
                ColumnKind::Categorical { categories } if categories.is_empty() => {
                    AttributeKind::Inactive
                }
                ColumnKind::Categorical { categories } => {
                    AttributeKind::Categorical(categories.len())
                }
            })
            .collect();
        Ok(AttributeDescriptor::new(kinds)?)
    }

    /// Check that `forest` was trained on data with this schema's shape.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::SchemaModelMismatch`] if the attribute or class
    /// counts differ.
    pub fn check_model(&self, forest: &Forest) -> Result<(), IoError> {
        if self.columns.len() != forest.n_attributes() {
            return Err(IoError::SchemaModelMismatch {
                what: "attribute columns",
                schema: self.columns.len(),
                model: forest.n_attributes(),
            });
        }
        if self.classes.len() != forest.n_classes() {
            return Err(IoError::SchemaModelMismatch {
                what: "classes",
                schema: self.classes.len(),
                model: forest.n_classes(),
            });
        }
        Ok(())
    }

    /// Write the schema as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Json`] | encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| IoError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(n_columns = self.columns.len(), "schema saved");
        Ok(())
    }

    /// Read a schema written by [`Schema::save`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | file read failed |
    /// | [`IoError::Json`] | contents are not a schema |
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let text = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let schema: Self = serde_json::from_str(&text).map_err(|e| IoError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(
            n_columns = schema.columns.len(),
            n_classes = schema.classes.len(),
            "schema loaded"
        );
        Ok(schema)
    }
}
