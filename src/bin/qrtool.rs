use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qr_sentry::tools::{
    dataset_iter, dataset_root_from_env, extract_dataset, scan_file, scan_paths, write_dataset_csv,
};
use qr_sentry::{Analyzer, SentryConfig, Verdict};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrtool", version, about = "QR code fraud detection tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    /// TOML configuration file (QR_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single image
    Scan {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Analyze every image under a directory
    ScanDir {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Write training features for root/safe and root/fraud to CSV
    ExtractDataset {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = SentryConfig::load_layered(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Scan { image, format } => {
            let analyzer = Analyzer::from_config(&config)?;
            scan_cmd(&analyzer, &image, format)
        }
        Command::ScanDir {
            root,
            limit,
            format,
        } => {
            let analyzer = Analyzer::from_config(&config)?;
            scan_dir_cmd(&analyzer, root, limit, format)
        }
        Command::ExtractDataset { root, out } => {
            let analyzer = Analyzer::from_config(&config)?;
            extract_dataset_cmd(&analyzer, root, &out)
        }
    }
}

fn scan_cmd(analyzer: &Analyzer, image: &Path, format: Format) -> Result<ExitCode> {
    let verdict = scan_file(analyzer, image)
        .with_context(|| format!("failed to read {}", image.display()))?;
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&verdict)?),
        Format::Text => print_verdict(image, &verdict),
    }
    Ok(ExitCode::SUCCESS)
}

fn scan_dir_cmd(
    analyzer: &Analyzer,
    root: Option<PathBuf>,
    limit: Option<usize>,
    format: Format,
) -> Result<ExitCode> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let paths: Vec<PathBuf> = dataset_iter(&root, limit).collect();
    if paths.is_empty() {
        eprintln!("No images found under {}", root.display());
        return Ok(ExitCode::FAILURE);
    }

    let start = Instant::now();
    let results = scan_paths(analyzer, &paths);
    let elapsed = start.elapsed();

    let mut flagged = 0usize;
    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(verdict) => {
                if verdict.is_fraud {
                    flagged += 1;
                }
                match format {
                    Format::Json => println!(
                        "{}",
                        serde_json::json!({ "path": path, "verdict": verdict })
                    ),
                    Format::Text => print_verdict(path, verdict),
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", path.display());
            }
        }
    }

    eprintln!(
        "Scanned {} images in {:.2?}: {} flagged, {} failed",
        results.len(),
        elapsed,
        flagged,
        failed
    );
    Ok(ExitCode::SUCCESS)
}

fn extract_dataset_cmd(analyzer: &Analyzer, root: Option<PathBuf>, out: &Path) -> Result<ExitCode> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let samples = extract_dataset(&root, analyzer);
    let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    write_dataset_csv(BufWriter::new(file), &samples)?;

    let fraud = samples.iter().filter(|s| s.label == 1).count();
    eprintln!(
        "Wrote {} samples ({} safe, {} fraud) to {}",
        samples.len(),
        samples.len() - fraud,
        fraud,
        out.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn print_verdict(path: &Path, verdict: &Verdict) {
    let label = if verdict.is_fraud { "FRAUD" } else { "SAFE" };
    let score = verdict
        .score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}: {} ({} confidence, score {}) [{}] {}",
        path.display(),
        label,
        verdict.confidence,
        score,
        verdict.content_type,
        verdict.decoded_data
    );
    for reason in &verdict.reasons {
        println!("  - {reason}");
    }
}
