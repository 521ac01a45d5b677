use std::path::PathBuf;

/// Errors from forest training, classification, and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the number of trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid tree count provided.
        n_trees: usize,
    },

    /// Returned when the train fraction is outside [0.0, 1.0].
    #[error("train_fraction must be in [0.0, 1.0], got {fraction}")]
    InvalidTrainFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the instance source holds zero instances.
    #[error("training data has zero instances")]
    EmptyDataset,

    /// Returned when the descriptor length differs from the source's attribute count.
    #[error("attribute descriptor has {descriptor} entries, instances have {attributes} attributes")]
    DescriptorMismatch {
        /// Number of descriptor entries.
        descriptor: usize,
        /// Number of attributes per instance in the source.
        attributes: usize,
    },

    /// Returned when a descriptor code is below -1.
    #[error("invalid attribute descriptor code {code} at attribute {attribute}")]
    InvalidDescriptorCode {
        /// Zero-based attribute index.
        attribute: usize,
        /// The offending code.
        code: i32,
    },

    /// Returned when a categorical attribute declares zero categories or more
    /// than the persisted code form can hold.
    #[error("attribute {attribute} declares {n_categories} categories, expected 1..=i32::MAX")]
    InvalidCategoryCount {
        /// Zero-based attribute index.
        attribute: usize,
        /// The declared number of categories.
        n_categories: usize,
    },

    /// Returned when a class label is outside the range a matrix or storage accepts.
    #[error("class {class} at position {index} is out of range (limit {limit})")]
    ClassOutOfRange {
        /// Zero-based position of the label.
        index: usize,
        /// The offending class label.
        class: usize,
        /// Exclusive upper bound for class labels.
        limit: u64,
    },

    /// Returned when a continuous training value is NaN or infinite.
    #[error("non-finite value at instance {instance}, attribute {attribute}")]
    NonFiniteValue {
        /// Zero-based instance index.
        instance: usize,
        /// Zero-based attribute index.
        attribute: usize,
    },

    /// Returned when a categorical value is not an integer in [-1, n_categories).
    #[error(
        "invalid category {value} at instance {instance}, attribute {attribute} \
         (attribute has {n_categories} categories)"
    )]
    InvalidCategory {
        /// Zero-based instance index.
        instance: usize,
        /// Zero-based attribute index.
        attribute: usize,
        /// The offending raw value.
        value: f64,
        /// Number of categories declared for the attribute.
        n_categories: usize,
    },

    /// Returned when packed storage is requested for a continuous attribute.
    #[error("attribute {attribute} is continuous and cannot be bit-packed")]
    UnpackableAttribute {
        /// Zero-based attribute index.
        attribute: usize,
    },

    /// Returned when instance storage is built from inconsistent parts.
    #[error("instance storage holds {values} values, expected {expected}")]
    StorageShapeMismatch {
        /// Expected number of values (`instances * attributes`).
        expected: usize,
        /// Number of values actually supplied.
        values: usize,
    },

    /// Returned when a row has a different number of attributes than the first row.
    #[error("instance {instance} has {got} attributes, expected {expected}")]
    RaggedRow {
        /// Zero-based instance index.
        instance: usize,
        /// Number of attributes in the first row.
        expected: usize,
        /// Number of attributes in the offending row.
        got: usize,
    },

    /// Returned when the number of class labels differs from the number of instances.
    #[error("{classes} class labels supplied for {instances} instances")]
    ClassCountMismatch {
        /// Number of instances.
        instances: usize,
        /// Number of class labels.
        classes: usize,
    },

    /// Returned when a row passed to classification has the wrong length.
    #[error("row has {got} attributes, expected {expected}")]
    RowLengthMismatch {
        /// The number of attributes the model was trained on.
        expected: usize,
        /// The number of attributes in the row.
        got: usize,
    },

    /// Returned when every tree in the forest abstains for a row.
    #[error("no tree produced a vote")]
    NoVotes,

    /// Returned when training is cancelled between two tree inductions.
    #[error("training cancelled after {trees_completed} trees")]
    Cancelled {
        /// Number of trees finished before the cancellation was observed.
        trees_completed: usize,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model bytes cannot be decoded into a valid forest.
    #[error("malformed model: {reason}")]
    MalformedModel {
        /// Human-readable description of the defect.
        reason: String,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
