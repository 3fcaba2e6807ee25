use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

use ediflow::config::PipelineConfig;
use ediflow::edi::{DocumentParser, Edi850Document};
use ediflow::erp::{
    validate_purchase_order, ErpClient, ErpMapper, ErrorScenario, HttpErpClient, MockErp,
};
use ediflow::pipeline::Orchestrator;
use ediflow::storage::MemoryJobStore;

/// Parse, transform, validate and submit EDI 850 purchase orders
#[derive(Parser)]
#[command(name = "ediflow")]
#[command(about = "EDI 850 to ERP integration pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML pipeline configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an EDI 850 file and print the typed document as JSON
    Parse {
        /// Path to the EDI file
        file: PathBuf,
    },
    /// Parse and map an EDI 850 file, printing the ERP payload as JSON
    Transform {
        /// Path to the EDI file
        file: PathBuf,
    },
    /// Check an EDI 850 file against the ERP business rules
    Validate {
        /// Path to the EDI file
        file: PathBuf,
    },
    /// Run the full pipeline and print the execution report as JSON
    Process {
        /// Path to the EDI file
        file: PathBuf,

        /// Base URL of a real ERP endpoint (default: built-in simulated ERP)
        #[arg(long)]
        endpoint: Option<String>,

        /// Script the simulated ERP to reject every attempt with this scenario
        #[arg(long, value_enum, conflicts_with = "endpoint")]
        scenario: Option<Scenario>,

        /// Maximum submission attempts
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Delay in seconds before the second attempt (doubles thereafter)
        #[arg(long)]
        initial_delay: Option<f64>,

        /// Suppress per-stage progress logs
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scenario {
    Validation,
    Duplicate,
    Inventory,
    Timeout,
}

impl From<Scenario> for ErrorScenario {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Validation => Self::Validation,
            Scenario::Duplicate => Self::Duplicate,
            Scenario::Inventory => Self::Inventory,
            Scenario::Timeout => Self::Timeout,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,tower=debug", // -vvv shows everything including dependencies
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr) // keep stdout clean for JSON output
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("ediflow started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Parse { file } => run_parse(&file, &config),
        Commands::Transform { file } => run_transform(&file, &config),
        Commands::Validate { file } => run_validate(&file, &config),
        Commands::Process {
            file,
            endpoint,
            scenario,
            max_attempts,
            initial_delay,
            quiet,
        } => {
            run_process(
                &file,
                config,
                endpoint,
                scenario,
                max_attempts,
                initial_delay,
                quiet,
            )
            .await
        }
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn read_document(file: &Path, config: &PipelineConfig) -> Result<Edi850Document> {
    let edi = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read EDI file {}", file.display()))?;
    let document = DocumentParser::new(config.delimiters)
        .parse(&edi)
        .context("failed to parse EDI 850 document")?;
    Ok(document)
}

fn run_parse(file: &Path, config: &PipelineConfig) -> Result<()> {
    let document = read_document(file, config)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_transform(file: &Path, config: &PipelineConfig) -> Result<()> {
    let document = read_document(file, config)?;
    let payload = ErpMapper::new()
        .transform(&document)
        .context("failed to transform document to ERP schema")?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_validate(file: &Path, config: &PipelineConfig) -> Result<()> {
    let document = read_document(file, config)?;
    let payload = ErpMapper::new()
        .transform(&document)
        .context("failed to transform document to ERP schema")?;
    let violations = validate_purchase_order(&payload);

    if violations.is_empty() {
        println!(
            "Purchase order {} passed all business rules",
            payload.po_number
        );
        Ok(())
    } else {
        println!("Purchase order {} failed validation:", payload.po_number);
        for violation in &violations {
            println!("  - {violation}");
        }
        std::process::exit(1);
    }
}

async fn run_process(
    file: &Path,
    mut config: PipelineConfig,
    endpoint: Option<String>,
    scenario: Option<Scenario>,
    max_attempts: Option<u32>,
    initial_delay: Option<f64>,
    quiet: bool,
) -> Result<()> {
    let edi = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read EDI file {}", file.display()))?;

    if let Some(max_attempts) = max_attempts {
        ensure!(max_attempts >= 1, "--max-attempts must be at least 1");
        config.retry.max_attempts = max_attempts;
    }
    if let Some(initial_delay) = initial_delay {
        ensure!(
            initial_delay.is_finite() && initial_delay >= 0.0,
            "--initial-delay must be a non-negative number of seconds"
        );
        config.retry.initial_delay = Duration::from_secs_f64(initial_delay);
    }
    if quiet {
        config.logging = false;
    }

    let erp: Arc<dyn ErpClient> = match (endpoint, scenario) {
        (Some(url), _) => {
            Arc::new(HttpErpClient::new(url).context("failed to build ERP HTTP client")?)
        }
        (None, Some(scenario)) => Arc::new(MockErp::with_scenario(scenario.into())),
        (None, None) => Arc::new(MockErp::new()),
    };
    let store = Arc::new(MemoryJobStore::new());

    let orchestrator = Orchestrator::new(config, erp, store);
    let report = orchestrator.process(&edi).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}
