//! ksvm Command Line Interface
//!
//! Train, apply, and inspect kernel SVM models on dense CSV data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use ksvm::api::SVM;
use ksvm::core::{Result, SVMError, ThresholdPolicy};
use ksvm::kernel::{KernelType, RBFKernel};
use ksvm::persistence::SerializableModel;
use ksvm::{CSVDataset, Dataset};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "ksvm")]
#[command(about = "Kernel SVM trained with simplified SMO")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model
    Train(TrainArgs),
    /// Classify data using a trained model
    Classify(ClassifyArgs),
    /// Evaluate a model on labelled test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// KKT tolerance
    #[arg(short, long, default_value = "0.001")]
    tolerance: f64,

    /// Consecutive passes without changes before stopping
    #[arg(long, default_value = "10")]
    max_passes: usize,

    /// Hard cap on total passes (0 disables the cap)
    #[arg(long, default_value = "10000")]
    max_total_passes: usize,

    /// Seed for pair selection
    #[arg(long)]
    seed: Option<u64>,

    /// Kernel function
    #[arg(short, long, value_enum, default_value = "linear")]
    kernel: CliKernel,

    /// Kernel gamma (rbf, polynomial); defaults to 1 / n_features
    #[arg(long)]
    gamma: Option<f64>,

    /// Polynomial degree
    #[arg(long, default_value = "3")]
    degree: u32,

    /// Polynomial coef0
    #[arg(long, default_value = "1.0")]
    coef0: f64,

    /// Decision threshold policy
    #[arg(long, value_enum, default_value = "fixed")]
    threshold: CliThreshold,

    /// Leave the intercept out of decision values
    #[arg(long)]
    no_intercept: bool,

    /// Number of classes (defaults to the largest label + 1)
    #[arg(long)]
    num_classes: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum CliKernel {
    Linear,
    Rbf,
    Polynomial,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum CliThreshold {
    /// Threshold scores at 0
    Fixed,
    /// Threshold scores at the mean score of the input batch
    #[value(name = "batch-mean")]
    BatchMean,
}

impl From<CliThreshold> for ThresholdPolicy {
    fn from(threshold: CliThreshold) -> Self {
        match threshold {
            CliThreshold::Fixed => ThresholdPolicy::Fixed(0.0),
            CliThreshold::BatchMean => ThresholdPolicy::BatchMean,
        }
    }
}

#[derive(Args)]
struct ClassifyArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (CSV; the last column is ignored)
    #[arg(long)]
    data: PathBuf,

    /// Output file (prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file
    #[arg(long)]
    data: PathBuf,

    /// Show confusion matrix and per-class metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Classify(args) => classify_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn build_kernel(args: &TrainArgs, n_features: usize) -> Result<KernelType> {
    let gamma = args
        .gamma
        .unwrap_or_else(|| RBFKernel::with_auto_gamma(n_features.max(1)).gamma());
    match args.kernel {
        CliKernel::Linear => Ok(KernelType::Linear),
        CliKernel::Rbf => KernelType::rbf(gamma),
        CliKernel::Polynomial => KernelType::polynomial(args.degree, gamma, args.coef0),
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Loading training data from {:?}", args.data);
    let dataset = CSVDataset::from_file(&args.data)?;
    info!(
        "Loaded {} samples with {} features",
        dataset.len(),
        dataset.dim()
    );

    let kernel = build_kernel(&args, dataset.dim())?;
    info!("Kernel: {kernel:?}");

    let mut builder = SVM::with_kernel(kernel)
        .with_c(args.c)
        .with_tolerance(args.tolerance)
        .with_max_passes(args.max_passes)
        .with_max_total_passes(if args.max_total_passes == 0 {
            None
        } else {
            Some(args.max_total_passes)
        })
        .with_fit_intercept(!args.no_intercept)
        .with_threshold_policy(args.threshold.into());
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(num_classes) = args.num_classes {
        builder = builder.with_num_classes(num_classes);
    }

    let model = builder.train(&dataset)?;

    let model_info = model.info();
    info!(
        "Trained {} pair classifiers with {} support vectors in {} passes",
        model_info.n_classifiers, model_info.n_support_vectors, model_info.passes
    );

    SerializableModel::from_trained_model(&model)?.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    let accuracy = model.evaluate(&dataset)?;
    println!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn classify_command(args: ClassifyArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SerializableModel::<KernelType>::load_from_file(&args.model)?.to_trained_model()?;

    let dataset = CSVDataset::from_file(&args.data)?;
    let labels = model.classify_dataset(&dataset)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            let mut writer = BufWriter::new(file);
            write_labels(&mut writer, &labels)?;
            writer.flush()?;
            info!("Labels saved to: {path:?}");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_labels(&mut handle, &labels)?;
        }
    }

    Ok(())
}

fn write_labels<W: Write>(writer: &mut W, labels: &[usize]) -> Result<()> {
    writeln!(writer, "# Labels for {} samples", labels.len())?;
    writeln!(writer, "# Format: sample_index predicted_label")?;
    for (i, label) in labels.iter().enumerate() {
        writeln!(writer, "{i} {label}")?;
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable = SerializableModel::<KernelType>::load_from_file(&args.model)?;
    let model = serializable.to_trained_model()?;

    let dataset = CSVDataset::from_file(&args.data)?;
    if dataset.dim() != serializable.metadata.dim {
        return Err(SVMError::DimensionMismatch {
            expected: serializable.metadata.dim,
            actual: dataset.dim(),
        });
    }

    println!("=== Model Evaluation ===");
    serializable.print_summary();

    let metrics = model.evaluate_detailed(&dataset)?;
    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nConfusion Matrix (rows: actual, columns: predicted):");
        for (class, row) in metrics.confusion.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|count| format!("{count:>5}")).collect();
            println!("  {class:>3} |{}", cells.join(""));
        }
        println!("\nPer-class Metrics:");
        for class in 0..metrics.num_classes() {
            println!(
                "  class {class}: precision {:.4}, recall {:.4}, f1 {:.4}",
                metrics.precision(class),
                metrics.recall(class),
                metrics.f1_score(class)
            );
        }
        println!("  Macro F1: {:.4}", metrics.macro_f1());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable = SerializableModel::<KernelType>::load_from_file(&args.model)?;
    serializable.print_summary();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_args(kernel: CliKernel, gamma: Option<f64>) -> TrainArgs {
        TrainArgs {
            data: PathBuf::from("train.csv"),
            output: PathBuf::from("model.json"),
            c: 1.0,
            tolerance: 0.001,
            max_passes: 10,
            max_total_passes: 10_000,
            seed: None,
            kernel,
            gamma,
            degree: 2,
            coef0: 0.5,
            threshold: CliThreshold::Fixed,
            no_intercept: false,
            num_classes: None,
        }
    }

    #[test]
    fn test_build_kernel() {
        assert_eq!(
            build_kernel(&train_args(CliKernel::Linear, None), 4).unwrap(),
            KernelType::Linear
        );
        assert_eq!(
            build_kernel(&train_args(CliKernel::Rbf, None), 4).unwrap(),
            KernelType::Rbf { gamma: 0.25 }
        );
        assert_eq!(
            build_kernel(&train_args(CliKernel::Polynomial, Some(2.0)), 4).unwrap(),
            KernelType::Polynomial {
                degree: 2,
                gamma: 2.0,
                coef0: 0.5
            }
        );
        assert!(build_kernel(&train_args(CliKernel::Rbf, Some(-1.0)), 4).is_err());
    }

    #[test]
    fn test_threshold_conversion() {
        assert_eq!(
            ThresholdPolicy::from(CliThreshold::Fixed),
            ThresholdPolicy::Fixed(0.0)
        );
        assert_eq!(
            ThresholdPolicy::from(CliThreshold::BatchMean),
            ThresholdPolicy::BatchMean
        );
    }

    #[test]
    fn test_write_labels() {
        let mut buffer = Vec::new();
        write_labels(&mut buffer, &[2, 0]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "# Labels for 2 samples\n# Format: sample_index predicted_label\n0 2\n1 0\n"
        );
    }
}
