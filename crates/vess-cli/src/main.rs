//! VESS CLI: issue and verify EIP-712 signed verifiable credentials.
//!
//! Subcommands: init, keygen, issue, verify, digest.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vess_core::{EngineConfig, LoggingConfig};

/// VESS: verifiable credentials signed with Ethereum keys.
#[derive(Parser, Debug)]
#[command(name = "vess", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "vess.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Generate a new secp256k1 issuer key.
    Keygen(commands::keygen::KeygenArgs),
    /// Issue a signed verifiable credential.
    Issue(commands::issue::IssueArgs),
    /// Verify a verifiable credential.
    Verify(commands::verify::VerifyArgs),
    /// Show the EIP-712 digest of a credential.
    Digest(commands::digest::DigestArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Effective configuration for `cli`. `init` never reads the existing file,
/// so `init --force` can replace one that no longer parses.
fn resolve_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match cli.command {
        Commands::Init(_) => EngineConfig::default(),
        _ => EngineConfig::load(&cli.config)?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Issue(args) => commands::issue::run(args, &config).await,
        Commands::Verify(args) => commands::verify::run(args, &config).await,
        Commands::Digest(args) => commands::digest::run(args, &config),
    }
}
