use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_forest::{
    ClassDistribution, ConfusionMatrix, DEFAULT_TRAIN_FRACTION, FeatureMode, Forest, ForestConfig,
};
use arbor_io::{ExperimentName, InstanceReader, ResultWriter, Schema};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Random forest training and classification for tabular CSV data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility (0 = seeded from the system)
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for batch classification (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Output location shared by commands that write files.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train a forest on a labelled CSV file
    Train {
        /// Path to the training CSV file
        #[arg(long)]
        data: PathBuf,

        /// Name of the column holding class labels
        #[arg(long, default_value = "class")]
        class_column: String,

        /// Columns to exclude from training (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Minimum number of instances a node needs to be split
        #[arg(long, default_value_t = 1)]
        min_objects: usize,

        /// Maximum tree depth (unlimited if not set or 0)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Bagging fraction in (0, 1]; 1 disables bagging and OOB estimation
        #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)]
        train_fraction: f64,

        /// Attributes tried per node: "sqrt" or "all"
        #[arg(long, default_value = "sqrt")]
        feature_mode: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Classify a CSV file with a trained forest
    Predict {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        /// Path to the schema JSON written at training time
        #[arg(long)]
        schema: PathBuf,

        /// Path to the CSV file to classify
        #[arg(long)]
        data: PathBuf,

        /// Number of top-ranked classes to output per row
        #[arg(long, default_value_t = 3)]
        top_k: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the structure of a trained forest
    Inspect {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_instances: usize,
    n_attributes: usize,
    n_classes: usize,
    n_trees: usize,
    n_nodes: usize,
    oob_error: Option<f64>,
    model_path: PathBuf,
    schema_path: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_rows: usize,
    accuracy: Option<f64>,
    model_n_trees: usize,
    model_n_attributes: usize,
    model_n_classes: usize,
}

#[derive(Serialize)]
struct InspectOutput {
    n_trees: usize,
    n_attributes: usize,
    n_classes: usize,
    attribute_codes: Vec<i32>,
    min_objects: usize,
    max_depth: Option<usize>,
    train_fraction: f64,
    feature_mode: FeatureMode,
    seed: u64,
    trees: Vec<TreeOutput>,
}

#[derive(Serialize)]
struct TreeOutput {
    n_nodes: usize,
    n_leaves: usize,
    n_values: usize,
    n_distributions: usize,
}

fn parse_feature_mode(s: &str) -> Result<FeatureMode> {
    match s {
        "sqrt" => Ok(FeatureMode::Sqrt),
        "all" => Ok(FeatureMode::All),
        other => anyhow::bail!("unknown feature mode: {other} (expected sqrt or all)"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            class_column,
            ignore,
            n_trees,
            min_objects,
            max_depth,
            train_fraction,
            feature_mode,
            output,
        } => {
            let experiment_name = ExperimentName::new(output.experiment.clone())?;
            let feature_mode = parse_feature_mode(&feature_mode)?;

            // 1. Read dataset and infer schema
            let dataset = InstanceReader::new(&data, &class_column)
                .with_ignored(ignore)
                .read()
                .context("failed to read training CSV")?;
            let instances = dataset.to_instances()?;
            let descriptor = dataset.schema().descriptor()?;

            // 2. Train
            let config = ForestConfig::new(n_trees)?
                .with_min_objects(min_objects)
                .with_max_depth(max_depth)
                .with_train_fraction(train_fraction)
                .with_feature_mode(feature_mode)
                .with_seed(cli.seed);
            let result = config
                .fit(&instances, &descriptor)
                .context("training failed")?;
            info!(oob_error = ?result.oob_error(), "forest trained");

            // 3. Write model, schema and report
            let writer = ResultWriter::new(&output.output_dir, experiment_name)?;
            let model_path = writer
                .write_model(result.forest())
                .context("failed to save model")?;
            let schema_path = writer.write_schema(dataset.schema())?;
            writer.write_training(dataset.schema(), &result)?;

            // 4. Print summary
            let metadata = result.metadata();
            let summary = TrainOutput {
                experiment: output.experiment,
                n_instances: metadata.n_instances,
                n_attributes: metadata.n_attributes,
                n_classes: metadata.n_classes,
                n_trees: metadata.n_trees,
                n_nodes: metadata.n_nodes,
                oob_error: result.oob_error(),
                model_path,
                schema_path,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Predict {
            model,
            schema,
            data,
            top_k,
            output,
        } => {
            let experiment_name = ExperimentName::new(output.experiment.clone())?;

            // 1. Load model and schema
            let forest = Forest::load(&model).context("failed to load model")?;
            info!(
                n_trees = forest.n_trees(),
                n_attributes = forest.n_attributes(),
                n_classes = forest.n_classes(),
                "model loaded"
            );
            let schema = Schema::load(&schema).context("failed to load schema")?;
            schema
                .check_model(&forest)
                .context("schema does not match the model")?;

            // 2. Read and encode rows
            let dataset = InstanceReader::new(&data, schema.class_column())
                .read_with_schema(&schema)
                .context("failed to read input CSV")?;

            // 3. Classify
            let distributions = forest
                .classify_proba_batch(dataset.rows())
                .context("classification failed")?;

            // 4. Score against labels, if present
            let evaluation = match dataset.classes() {
                Some(actual) => {
                    let predicted: Vec<usize> = distributions
                        .iter()
                        .map(ClassDistribution::predicted_class)
                        .collect();
                    let cm = ConfusionMatrix::from_labels(actual, &predicted, forest.n_classes())?;
                    info!(accuracy = cm.accuracy(), "labelled input scored");
                    Some(cm)
                }
                None => None,
            };

            // 5. Write predictions JSON
            let writer = ResultWriter::new(&output.output_dir, experiment_name)?;
            writer.write_predictions(&schema, &distributions, top_k, evaluation.as_ref())?;

            // 6. Print summary
            let summary = PredictOutput {
                experiment: output.experiment,
                n_rows: dataset.n_rows(),
                accuracy: evaluation.as_ref().map(ConfusionMatrix::accuracy),
                model_n_trees: forest.n_trees(),
                model_n_attributes: forest.n_attributes(),
                model_n_classes: forest.n_classes(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Inspect { model } => {
            let forest = Forest::load(&model).context("failed to load model")?;
            let config = forest.config();
            let summary = InspectOutput {
                n_trees: forest.n_trees(),
                n_attributes: forest.n_attributes(),
                n_classes: forest.n_classes(),
                attribute_codes: forest.descriptor().codes(),
                min_objects: config.min_objects(),
                max_depth: config.max_depth(),
                train_fraction: config.train_fraction(),
                feature_mode: config.feature_mode(),
                seed: config.seed(),
                trees: forest
                    .trees()
                    .iter()
                    .map(|tree| TreeOutput {
                        n_nodes: tree.n_nodes(),
                        n_leaves: tree.n_leaves(),
                        n_values: tree.values().len(),
                        n_distributions: tree.n_distributions(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
