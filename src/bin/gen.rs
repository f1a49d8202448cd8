//! domlist-gen: CLI tool for converting ad-blocking rule lists into domain lists.

use clap::{Parser, Subcommand};
use domlist::{
    extract_anchored_domains, sink, AdGuardBackup, ConvertConfig, DomainListWriter, Error,
    FilterSource, Pipeline, RunSummary, SourceLoader, WriteOptions,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "domlist-gen")]
#[command(author = "Kaitu.io")]
#[command(version)]
#[command(about = "Convert AdGuard, hosts and domain lists into sorted domain lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single list (URL or file)
    Convert {
        /// Input URL or file path
        #[arg(short, long)]
        input: String,

        /// List name, used for output file names
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Download timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Write the list even when no domain was extracted
        #[arg(long)]
        write_empty: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert every source listed in a YAML config
    Batch {
        /// Config file
        #[arg(short, long)]
        config: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert the filters and custom rules of an AdGuard Home backup
    Backup {
        /// AdGuardHome.yaml backup
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Maximum concurrent downloads
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Download timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract ||domain^ tokens from a block of custom rules
    Custom {
        /// Text file holding the rule block ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Convert { verbose, .. }
            | Commands::Batch { verbose, .. }
            | Commands::Backup { verbose, .. }
            | Commands::Custom { verbose, .. } => *verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.command.verbose() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let outcome = match cli.command {
        Commands::Convert {
            input,
            name,
            output_dir,
            timeout,
            write_empty,
            ..
        } => convert_one(input, name, output_dir, timeout, write_empty),
        Commands::Batch { config, .. } => run_batch(&config),
        Commands::Backup {
            input,
            output_dir,
            workers,
            timeout,
            ..
        } => run_backup(&input, output_dir, workers, timeout),
        Commands::Custom { input, output, .. } => run_custom(&input, output.as_ref()).map(|_| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn convert_one(
    input: String,
    name: Option<String>,
    output_dir: PathBuf,
    timeout: u64,
    write_empty: bool,
) -> CliResult<bool> {
    let name = name.unwrap_or_else(|| default_name(&input));
    let source = FilterSource::new(input, name);

    let loader = SourceLoader::new(Duration::from_secs(timeout))?;
    let pipeline = Pipeline::new(loader, 1);
    let writer = DomainListWriter::new(output_dir)?;

    let summary = pipeline.write_all(
        &[source],
        &writer,
        WriteOptions {
            write_empty,
            merge: false,
        },
    )?;
    Ok(report(&summary))
}

fn run_batch(config_path: &PathBuf) -> CliResult<bool> {
    let config = ConvertConfig::load(config_path)?;
    if config.sources.is_empty() {
        return Err(format!("no sources configured in {:?}", config_path).into());
    }

    let loader = SourceLoader::new(config.timeout())?;
    let pipeline = Pipeline::new(loader, config.workers);
    let writer = DomainListWriter::new(&config.output_dir)?;

    let summary = pipeline.write_all(
        &config.sources,
        &writer,
        WriteOptions {
            write_empty: config.write_empty,
            merge: config.merge,
        },
    )?;
    Ok(report(&summary))
}

fn run_backup(input: &PathBuf, output_dir: PathBuf, workers: usize, timeout: u64) -> CliResult<bool> {
    let yaml_content = fs::read_to_string(input)?;
    let backup = AdGuardBackup::parse(&yaml_content)?;
    let sources = backup.sources();
    log::info!(
        "Backup has {} enabled filters and {} custom rules",
        sources.len(),
        backup.custom_rules().len()
    );

    let loader = SourceLoader::new(Duration::from_secs(timeout))?;
    let pipeline = Pipeline::new(loader, workers);
    let writer = DomainListWriter::new(output_dir)?;

    let summary = pipeline.write_all(&sources, &writer, WriteOptions::default())?;
    let ok = report(&summary);

    if pipeline
        .write_custom_rules(backup.custom_rules(), &writer, false)?
        .is_none()
    {
        eprintln!("  Warning: no custom rule domains found in {:?}", input);
    }

    Ok(ok)
}

fn run_custom(input: &PathBuf, output: Option<&PathBuf>) -> CliResult<()> {
    let text = if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(input)?
    };

    let domains = extract_anchored_domains(text.lines());
    if domains.is_empty() {
        eprintln!("  Warning: no domains extracted from {:?}", input);
    }

    match output {
        Some(path) => {
            sink::write_file(path, &domains)?;
            println!("Extracted {} domains -> {:?}", domains.len(), path);
        }
        None => domains.write_lines(io::BufWriter::new(io::stdout().lock()))?,
    }
    Ok(())
}

/// Print a run summary. Returns `false` if any source failed.
fn report(summary: &RunSummary) -> bool {
    for written in &summary.written {
        println!("Generated {:?}", written.blocked_path);
        if let Some(allow) = &written.allowed_path {
            println!("Generated {:?}", allow);
        }
    }
    for name in &summary.empty {
        eprintln!("  Warning: {}", Error::EmptyResult(name.clone()));
    }
    for (name, e) in &summary.failed {
        eprintln!("  Warning: failed to process {}: {}", name, e);
    }
    summary.is_success()
}

/// Derive a list name from the last path segment of a locator.
fn default_name(locator: &str) -> String {
    let trimmed = locator.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        "list".to_string()
    } else {
        stem.to_string()
    }
}
