//! I/O error types for arbor-io.

use std::path::PathBuf;

use arbor_forest::ForestError;

/// Errors from CSV parsing, schema handling, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a required column is absent from the header.
    #[error("column \"{column}\" not found in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the missing column.
        column: String,
    },

    /// Returned when the header has no attribute column besides the class column.
    #[error("no attribute columns in {path}")]
    NoAttributeColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a continuous cell is empty, unparseable, or not finite.
    #[error("invalid continuous value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidContinuousValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column name.
        column: String,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when a labelled row has an empty or missing class cell.
    #[error("missing class label in {path}: row {row_index}")]
    MissingClassLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when a class label is not part of the trained schema.
    #[error("unknown class label \"{label}\" in {path}: row {row_index}")]
    UnknownClassLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The unknown label.
        label: String,
    },

    /// Returned when a column named for exclusion does not exist in the schema.
    #[error("cannot ignore unknown column \"{column}\"")]
    UnknownColumn {
        /// The requested column name.
        column: String,
    },

    /// Returned when a schema and a model disagree on their shape.
    #[error("schema has {schema} {what} but the model has {model}")]
    SchemaModelMismatch {
        /// What was compared, e.g. "attribute columns".
        what: &'static str,
        /// Count on the schema side.
        schema: usize,
        /// Count on the model side.
        model: usize,
    },

    /// Returned when class labels are required but the data has none.
    #[error("dataset has no class labels")]
    Unlabeled,

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a JSON document cannot be encoded or decoded.
    #[error("invalid JSON in {path}")]
    Json {
        /// Path of the document.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when the model layer rejects the data or the model file.
    #[error(transparent)]
    Forest(#[from] ForestError),
}
