//! End-to-end integration tests: CSV -> train -> model/schema/JSON -> reload -> predict.

use std::fs;
use std::path::Path;

use arbor_forest::{ClassDistribution, ConfusionMatrix, FeatureMode, Forest, ForestConfig};
use arbor_io::{ColumnKind, ExperimentName, InstanceReader, IoError, ResultWriter, Schema};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_training() -> arbor_io::Dataset {
    InstanceReader::new(&fixture_path("weather_train.csv"), "play")
        .with_ignored(vec!["id".into()])
        .read()
        .expect("fixture should parse")
}

#[test]
fn training_schema_inference() {
    let dataset = read_training();
    let schema = dataset.schema();

    assert_eq!(dataset.n_rows(), 72);
    assert_eq!(schema.classes(), &["yes".to_string(), "no".to_string()]);

    let kinds: Vec<&ColumnKind> = schema.columns().iter().map(|c| &c.kind).collect();
    assert_eq!(kinds[0], &ColumnKind::Inactive);
    assert_eq!(
        kinds[1],
        &ColumnKind::Categorical {
            categories: vec!["sunny".into(), "overcast".into(), "rain".into()]
        }
    );
    assert_eq!(kinds[2], &ColumnKind::Continuous);
    assert_eq!(kinds[3], &ColumnKind::Continuous);
    assert_eq!(schema.descriptor().unwrap().codes(), vec![-1, 3, 0, 0, 2]);
}

#[test]
fn train_round_trip() {
    // 1. Read CSV and train
    let dataset = read_training();
    let data = dataset.to_instances().unwrap();
    let result = ForestConfig::new(50)
        .unwrap()
        .with_feature_mode(FeatureMode::All)
        .with_seed(42)
        .fit(&data, &dataset.schema().descriptor().unwrap())
        .unwrap();

    // 2. Write model, schema, and report
    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("weather".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let model_path = writer.write_model(result.forest()).unwrap();
    let schema_path = writer.write_schema(dataset.schema()).unwrap();
    let report_path = writer.write_training(dataset.schema(), &result).unwrap();

    // 3. Reload and verify
    let forest = Forest::load(&model_path).unwrap();
    assert_eq!(&forest, result.forest());
    let schema = Schema::load(&schema_path).unwrap();
    assert_eq!(&schema, dataset.schema());

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "weather");
    assert_eq!(content["n_trees"].as_u64().unwrap(), 50);
    assert_eq!(content["n_instances"].as_u64().unwrap(), 72);
    assert_eq!(content["n_active_attributes"].as_u64().unwrap(), 4);
    assert_eq!(content["feature_mode"], "all");
    let oob_error = content["oob_error"].as_f64().unwrap();
    assert!(oob_error < 0.15, "OOB error {oob_error} too high");

    // 4. Predict a holdout file whose columns are in a different order
    let holdout = InstanceReader::new(&fixture_path("weather_holdout.csv"), "play")
        .read_with_schema(&schema)
        .unwrap();
    let distributions = forest.classify_proba_batch(holdout.rows()).unwrap();
    let predicted: Vec<usize> = distributions
        .iter()
        .map(ClassDistribution::predicted_class)
        .collect();
    let cm = ConfusionMatrix::from_labels(
        holdout.classes().unwrap(),
        &predicted,
        forest.n_classes(),
    )
    .unwrap();
    assert!(cm.correct() >= 5, "holdout confusion:\n{cm}");

    let predict_path = writer
        .write_predictions(&schema, &distributions, 2, Some(&cm))
        .unwrap();
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&predict_path).unwrap()).unwrap();
    assert_eq!(content["n_rows"].as_u64().unwrap(), 6);
    assert_eq!(content["predictions"].as_array().unwrap().len(), 6);
    assert_eq!(content["predictions"][2]["predicted_class"], "yes");
}

#[test]
fn unlabeled_rows_with_unseen_category() {
    let dataset = read_training();
    let data = dataset.to_instances().unwrap();
    let forest = ForestConfig::new(20)
        .unwrap()
        .with_seed(3)
        .fit(&data, &dataset.schema().descriptor().unwrap())
        .unwrap()
        .into_forest();

    let new = InstanceReader::new(&fixture_path("weather_unlabeled.csv"), "play")
        .read_with_schema(dataset.schema())
        .unwrap();
    assert!(new.classes().is_none());
    assert_eq!(new.rows()[2][1], -1.0, "unseen outlook encodes as -1");

    let distributions = forest.classify_proba_batch(new.rows()).unwrap();
    assert_eq!(distributions.len(), 3);
    for dist in &distributions {
        let total: f64 = dist.as_slice().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
    assert!(matches!(new.to_instances(), Err(IoError::Unlabeled)));
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    // empty.csv -> EmptyDataset
    let result = InstanceReader::new(&fixture_path("empty.csv"), "play").read();
    assert!(
        matches!(result, Err(IoError::EmptyDataset { .. })),
        "empty.csv should give EmptyDataset, got: {:?}",
        result
    );

    // jagged.csv -> InconsistentRowLength
    let result = InstanceReader::new(&fixture_path("jagged.csv"), "play").read();
    assert!(
        matches!(result, Err(IoError::InconsistentRowLength { .. })),
        "jagged.csv should give InconsistentRowLength, got: {:?}",
        result
    );
}
