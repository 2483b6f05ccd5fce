//! sit4onnx - measure ONNX model inference latency on a chosen execution provider.

mod report;

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sit4onnx_core::dump::dump_outputs;
use sit4onnx_core::options::validate_model_path;
use sit4onnx_core::{
    prepare_inputs, BenchConfig, BenchOptions, BenchReport, InferenceBackend, OrtBackend,
    ProviderKind, Runner,
};

use report::{ReportMode, Reporter};

/// Simple inference test for ONNX models
#[derive(Parser)]
#[command(name = "sit4onnx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input onnx file path.
    #[arg(long = "input_onnx_file_path")]
    input_onnx_file_path: PathBuf,

    /// Value to be substituted if input batch size is undefined. This is
    /// ignored if the input dimensions are all of static size. [default: 1]
    #[arg(long = "batch_size", allow_negative_numbers = true)]
    batch_size: Option<i64>,

    /// Number of times to run the test. The total execution time is divided by
    /// the number of times the test is executed, and the average inference
    /// time per inference is displayed. [default: 10]
    #[arg(long = "test_loop_count", allow_negative_numbers = true)]
    test_loop_count: Option<i64>,

    /// ONNX Execution Provider. [default: tensorrt]
    #[arg(long = "onnx_execution_provider", value_enum)]
    onnx_execution_provider: Option<ProviderArg>,

    /// Outputs the last inference result to an .npy file.
    #[arg(long = "output_numpy_file")]
    output_numpy_file: bool,

    /// Do not show all information logs. Only error logs are displayed.
    #[arg(long = "non_verbose")]
    non_verbose: bool,

    /// Report format
    #[arg(long = "report_format", value_enum, default_value = "text")]
    report_format: ReportFormat,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn report_mode(&self) -> ReportMode {
        match (self.non_verbose, self.report_format) {
            (true, _) => ReportMode::Quiet,
            (false, ReportFormat::Text) => ReportMode::Text,
            (false, ReportFormat::Json) => ReportMode::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    #[value(name = "tensorrt")]
    TensorRt,
    #[value(name = "cuda")]
    Cuda,
    #[value(name = "openvino_cpu")]
    OpenVinoCpu,
    #[value(name = "openvino_gpu")]
    OpenVinoGpu,
    #[value(name = "cpu")]
    Cpu,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::TensorRt => ProviderKind::TensorRt,
            ProviderArg::Cuda => ProviderKind::Cuda,
            ProviderArg::OpenVinoCpu => ProviderKind::OpenVinoCpu,
            ProviderArg::OpenVinoGpu => ProviderKind::OpenVinoGpu,
            ProviderArg::Cpu => ProviderKind::Cpu,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Coloured log lines
    Text,
    /// A single JSON document
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("{} {:#}", style("ERROR:").red(), err);
        process::exit(1);
    }

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", style("ERROR:").red(), err);
        process::exit(1);
    }
}

/// Filter directives for a verbosity setting. ONNX Runtime's own log stream
/// is held at `warn` unless `-vv` or more is given.
fn log_directives(verbose: u8, non_verbose: bool) -> String {
    let level = if non_verbose {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let ort_level = match level {
        "debug" | "trace" => level,
        "error" => "error",
        _ => "warn",
    };

    format!("{},ort={}", level, ort_level)
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(cli.verbose, cli.non_verbose)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sit4onnx").join("config.json"))
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<BenchConfig> {
    if let Some(path) = explicit {
        return BenchConfig::from_file(path)
            .with_context(|| format!("failed to read config file {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Using config file {}", path.display());
            BenchConfig::from_file(&path)
                .with_context(|| format!("failed to read config file {}", path.display()))
        }
        _ => Ok(BenchConfig::default()),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    validate_model_path(&cli.input_onnx_file_path)?;
    let config = load_config(cli.config.as_deref())?;

    // Command line flags win over the config file.
    let mut options = BenchOptions::from_config(&cli.input_onnx_file_path, &config);
    if let Some(batch_size) = cli.batch_size {
        options.batch_size = batch_size;
    }
    if let Some(test_loop_count) = cli.test_loop_count {
        options.test_loop_count = test_loop_count;
    }
    if let Some(provider) = cli.onnx_execution_provider {
        options.provider = provider.into();
    }

    options.validate()?;
    let test_loop_count = options.test_loop_count as usize;

    let descriptor = config.providers.descriptor(options.provider, &options.model_path);
    info!("Execution provider: {} ({})", options.provider, descriptor.ep_name());

    let mode = cli.report_mode();
    let mut reporter = Reporter::new(io::stdout(), mode);

    let spinner = if mode == ReportMode::Text {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(format!("Building session for {}...", descriptor.ep_name()));

    let backend = OrtBackend::from_file(&options.model_path, &descriptor)
        .with_context(|| format!("failed to load {}", options.model_path.display()))?;
    spinner.finish_and_clear();

    let bank = prepare_inputs(&backend, options.batch_size)?;

    reporter.providers(backend.providers())?;
    reporter.provider_options(&descriptor)?;
    reporter.inputs(&bank)?;

    let outcome = Runner::new(&backend).run(&bank, test_loop_count)?;
    let mut report = BenchReport::new(&backend, &bank, outcome);

    if cli.output_numpy_file && !report.results.is_empty() {
        report.saved_files = dump_outputs(
            &config.output.numpy_dir,
            &config.output.file_prefix,
            &report.results,
        )?;
    }

    reporter.results(&report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_come_from_config() {
        let cli = Cli::try_parse_from(["sit4onnx", "--input_onnx_file_path", "m.onnx"]).unwrap();
        assert_eq!(cli.batch_size, None);
        assert_eq!(cli.test_loop_count, None);
        assert_eq!(cli.onnx_execution_provider, None);
        assert!(!cli.output_numpy_file);
        assert!(!cli.non_verbose);
        assert_eq!(cli.report_format, ReportFormat::Text);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "sit4onnx",
            "--input_onnx_file_path",
            "m.onnx",
            "--batch_size",
            "4",
            "--test_loop_count",
            "-2",
            "--onnx_execution_provider",
            "openvino_gpu",
            "--output_numpy_file",
            "--non_verbose",
        ])
        .unwrap();

        assert_eq!(cli.batch_size, Some(4));
        assert_eq!(cli.test_loop_count, Some(-2));
        assert_eq!(cli.onnx_execution_provider, Some(ProviderArg::OpenVinoGpu));
        assert!(cli.output_numpy_file);
        assert!(cli.non_verbose);
    }

    #[test]
    fn test_provider_names_match_registry() {
        for kind in ProviderKind::ALL {
            let arg = ProviderArg::from_str(kind.name(), false).unwrap();
            assert_eq!(ProviderKind::from(arg), kind);
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Cli::try_parse_from([
            "sit4onnx",
            "--input_onnx_file_path",
            "m.onnx",
            "--onnx_execution_provider",
            "rocm",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_model_path_required() {
        assert!(Cli::try_parse_from(["sit4onnx"]).is_err());
    }

    #[test]
    fn test_report_mode() {
        let parse = |extra: &[&str]| {
            let mut args = vec!["sit4onnx", "--input_onnx_file_path", "m.onnx"];
            args.extend_from_slice(extra);
            Cli::try_parse_from(args).unwrap().report_mode()
        };

        assert_eq!(parse(&[]), ReportMode::Text);
        assert_eq!(parse(&["--report_format", "json"]), ReportMode::Json);
        assert_eq!(parse(&["--non_verbose"]), ReportMode::Quiet);
        assert_eq!(parse(&["--non_verbose", "--report_format", "json"]), ReportMode::Quiet);
    }

    #[test]
    fn test_log_directives() {
        assert_eq!(log_directives(0, false), "warn,ort=warn");
        assert_eq!(log_directives(1, false), "info,ort=warn");
        assert_eq!(log_directives(2, false), "debug,ort=debug");
        assert_eq!(log_directives(5, false), "trace,ort=trace");
        assert_eq!(log_directives(3, true), "error,ort=error");
    }
}
