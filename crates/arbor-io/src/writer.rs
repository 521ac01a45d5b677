//! Model, schema and JSON report writer for training and prediction runs.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_forest::{ClassDistribution, ConfusionMatrix, FeatureMode, Forest, ForestResult};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;
use crate::schema::Schema;

/// Writes models and run reports into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_model.bin`, `{experiment}_schema.json`,
/// `{experiment}_train.json` and `{experiment}_predict.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the binary model file.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.file("model.bin")
    }

    /// Return the path of the schema file.
    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.file("schema.json")
    }

    /// Save the forest to [`ResultWriter::model_path`].
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Forest`] if the model cannot be encoded or written.
    pub fn write_model(&self, forest: &Forest) -> Result<PathBuf, IoError> {
        let path = self.model_path();
        forest.save(&path)?;
        info!(path = %path.display(), "model written");
        Ok(path)
    }

    /// Save the schema to [`ResultWriter::schema_path`].
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] or [`IoError::WriteFile`] on failure.
    pub fn write_schema(&self, schema: &Schema) -> Result<PathBuf, IoError> {
        let path = self.schema_path();
        schema.save(&path)?;
        Ok(path)
    }

    /// Write the training report to `{experiment}_train.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_training(&self, schema: &Schema, result: &ForestResult) -> Result<PathBuf, IoError> {
        let config = result.forest().config();
        let metadata = result.metadata();
        let oob = result.oob();

        let class_metrics = oob
            .confusion
            .class_metrics()
            .into_iter()
            .map(|m| ClassEntry {
                class: class_label(schema, m.class),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        let artifact = TrainingArtifact {
            experiment: self.experiment.as_str(),
            class_column: schema.class_column(),
            classes: schema.classes(),
            n_trees: metadata.n_trees,
            n_instances: metadata.n_instances,
            n_attributes: metadata.n_attributes,
            n_active_attributes: metadata.n_active_attributes,
            n_nodes: metadata.n_nodes,
            n_leaves: metadata.n_leaves,
            train_fraction: config.train_fraction(),
            max_depth: config.max_depth(),
            min_objects: config.min_objects(),
            feature_mode: feature_mode_name(config.feature_mode()),
            seed: config.seed(),
            oob_error: oob.error,
            oob_evaluated: oob.n_evaluated,
            oob_tied: oob.n_tied,
            oob_confusion: oob.confusion.as_rows(),
            oob_class_metrics: class_metrics,
        };

        let path = self.file("train.json");
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "training report written");
        Ok(path)
    }

    /// Write per-row predictions to `{experiment}_predict.json`.
    ///
    /// `evaluation` is the confusion matrix against known labels, if the
    /// input carried them.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all, fields(n_rows = distributions.len()))]
    pub fn write_predictions(
        &self,
        schema: &Schema,
        distributions: &[ClassDistribution],
        top_k: usize,
        evaluation: Option<&ConfusionMatrix>,
    ) -> Result<PathBuf, IoError> {
        let predictions = distributions
            .iter()
            .enumerate()
            .map(|(row, dist)| PredictionEntry {
                row,
                predicted_class: class_label(schema, dist.predicted_class()),
                confidence: dist.confidence(),
                top_k: dist
                    .top_k(top_k)
                    .into_iter()
                    .map(|(class, probability)| RankedClass {
                        class: class_label(schema, class),
                        probability,
                    })
                    .collect(),
            })
            .collect();

        let artifact = PredictionArtifact {
            experiment: self.experiment.as_str(),
            n_rows: distributions.len(),
            classes: schema.classes(),
            accuracy: evaluation.map(ConfusionMatrix::accuracy),
            confusion_matrix: evaluation.map(ConfusionMatrix::as_rows),
            predictions,
        };

        let path = self.file("predict.json");
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn class_label(schema: &Schema, class: usize) -> &str {
    schema.class_name(class).unwrap_or("?")
}

fn feature_mode_name(mode: FeatureMode) -> &'static str {
    match mode {
        FeatureMode::All => "all",
        FeatureMode::Sqrt => "sqrt",
    }
}

// Shadow structs for JSON output.

#[derive(Serialize)]
struct TrainingArtifact<'a> {
    experiment: &'a str,
    class_column: &'a str,
    classes: &'a [String],
    n_trees: usize,
    n_instances: usize,
    n_attributes: usize,
    n_active_attributes: usize,
    n_nodes: usize,
    n_leaves: usize,
    train_fraction: f64,
    max_depth: Option<usize>,
    min_objects: usize,
    feature_mode: &'static str,
    seed: u64,
    oob_error: Option<f64>,
    oob_evaluated: usize,
    oob_tied: usize,
    oob_confusion: &'a [Vec<usize>],
    oob_class_metrics: Vec<ClassEntry<'a>>,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    class: &'a str,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct PredictionArtifact<'a> {
    experiment: &'a str,
    n_rows: usize,
    classes: &'a [String],
    accuracy: Option<f64>,
    confusion_matrix: Option<&'a [Vec<usize>]>,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    row: usize,
    predicted_class: &'a str,
    confidence: f64,
    top_k: Vec<RankedClass<'a>>,
}

#[derive(Serialize)]
struct RankedClass<'a> {
    class: &'a str,
    probability: f64,
}
