use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use irspec_core::{ingest, parse_and_validate, IngestOptions, Target, TestLevel};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "irspec")]
#[command(about = "Validate and canonicalize model-generated test specifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a canonical Given/When/Then suite and print the report
    Validate {
        /// Generated specification file (JSON or YAML, optionally fenced)
        input: PathBuf,

        /// Ingestion options file (JSON or YAML)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Convert a generated specification into canonical test specs
    Convert {
        /// Generated specification file (JSON or YAML, optionally fenced)
        input: PathBuf,

        /// Name of the function under test
        #[arg(long)]
        function: String,

        /// Source file declaring the function
        #[arg(long)]
        file: Option<PathBuf>,

        /// Test level recorded on every spec
        #[arg(long, value_enum, default_value_t = LevelArg::Unit)]
        level: LevelArg,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ingestion options file (JSON or YAML)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LevelArg {
    Unit,
    Api,
    E2e,
}

impl From<LevelArg> for TestLevel {
    fn from(val: LevelArg) -> Self {
        match val {
            LevelArg::Unit => TestLevel::Unit,
            LevelArg::Api => TestLevel::Api,
            LevelArg::E2e => TestLevel::E2e,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            input,
            options,
            format,
        } => {
            let options = load_options(options.as_deref())?;
            let text = read_input(&input)?;

            let (suite, result) = parse_and_validate(&text, &options)
                .map_err(|e| anyhow::Error::from(e).context("Validation failed"))?;

            write_json(&result, None, format)?;
            tracing::info!(function = %suite.function_name, "{}", result.summary());

            if !result.valid {
                anyhow::bail!("{}", result.summary());
            }
        }
        Commands::Convert {
            input,
            function,
            file,
            level,
            output,
            options,
            format,
        } => {
            let options = load_options(options.as_deref())?;
            let text = read_input(&input)?;

            let mut target = Target::function(function).with_level(level.into());
            if let Some(path) = file {
                target = target.with_file(path.display().to_string());
            }

            let result = ingest(&text, &target, &options)
                .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?;
            tracing::debug!(
                shape = ?result.shape,
                specs = result.specs.len(),
                "converted specification"
            );

            write_json(&result.specs, output.as_ref(), format)?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

/// Defaults when no file is given. YAML parsing covers JSON files too.
fn load_options(path: Option<&Path>) -> Result<IngestOptions> {
    let Some(path) = path else {
        return Ok(IngestOptions::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse options from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
