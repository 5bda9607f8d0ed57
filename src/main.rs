//! sve - service vulnerability enumerator
//!
//! # Usage
//!
//! ```bash
//! # Audit every installed service sve has rules for
//! sve
//!
//! # Only audit some services
//! sve --services ftp,ssh
//!
//! # Machine-readable output
//! sve --format json-pretty
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sve::{
    config::Config,
    engine::{catalog::Catalog, AuditEngine},
    host::{self, SystemHost},
    output::{self, TextRenderer},
};

#[derive(Parser)]
#[command(name = "sve")]
#[command(version)]
#[command(about = "Audit service daemon configs for insecure settings", long_about = None)]
struct Cli {
    /// Services to audit, comma separated (default: all installed)
    #[arg(short, long, value_delimiter = ',')]
    services: Vec<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distribution name, as in /etc/os-release NAME=
    #[arg(long)]
    distro: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
    /// JSON with pretty printing
    JsonPretty,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(),
    };
    if let Some(distro) = cli.distro {
        config.general.distro = Some(distro);
    }

    // Rules are compiled and validated before anything is audited
    let catalog = match config.catalog_path() {
        Some(path) => Catalog::from_file(&path)
            .with_context(|| format!("loading rule catalog {}", path.display()))?,
        None => Catalog::builtin().context("compiling built-in rules")?,
    };

    // Gather facts
    let host = SystemHost;
    let distro_name = host::detect_distro(&config, &host).context("detecting distribution")?;
    let distro = config.distro(&distro_name)?;
    let targets = host::resolve_targets(distro, &catalog, &cli.services, &host);

    for service in &targets.unknown {
        eprintln!("error: unknown service: {}", service);
    }

    // Start tests
    let engine = AuditEngine::new(catalog);
    let report = engine.run(&targets.services, &targets.config_paths, &targets.versions);

    let rendered = match cli.format {
        OutputFormat::Text => TextRenderer::from_env(!cli.no_color).render(&report, &targets.active),
        OutputFormat::Json => output::render_json(&report, false)?,
        OutputFormat::JsonPretty => output::render_json(&report, true)?,
    };
    print!("{}", rendered);

    Ok(())
}
