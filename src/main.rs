use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use strata::core::{AnalysisConfig, StructureAnalyzer};
use strata::formatters::JsonFormatter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "strata",
    version = "0.1.0",
    author = "strata developers",
    about = "Levelized package and module dependency structure"
)]
struct Cli {
    /// Root directory to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file for the view model
    #[arg(short, long, value_name = "FILE", default_value = "strata.json")]
    output: PathBuf,

    /// Regular expression matched against qualified names; repeatable
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    excludes: Vec<String>,

    /// Merge C-family header/implementation pairs into one module
    #[arg(long)]
    pair_headers: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strata=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        excludes,
        pair_headers,
        compact,
    } = cli;

    let start_time = Instant::now();

    let config = AnalysisConfig::new(input)
        .with_excludes(excludes)
        .with_pair_normalization(pair_headers);

    let analyzer = StructureAnalyzer::new()?;
    let analysis = analyzer.analyze(&config)?;

    let formatter = if compact {
        JsonFormatter::new().compact()
    } else {
        JsonFormatter::new()
    };
    formatter.format_to_file(&analysis, &output)?;

    println!(
        "{} dependencies, {} feedback",
        analysis.dependencies().len(),
        analysis.feedback().len()
    );
    println!("View model: {}", output.display());
    println!(
        "Total execution time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
