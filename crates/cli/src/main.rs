//! conflictkit command-line tool.
//!
//! Provides subcommands for inspecting the conflict blocks of a file,
//! resolving them side by side (or with manual text), and generating /
//! validating configuration files.

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use conflictkit_core::config::{EngineConfig, DEFAULT_CONFIG_TEMPLATE};
use conflictkit_core::errors::ConfigError;

use commands::resolve::ResolveArgs;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// conflictkit command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "conflictkit",
    version,
    about = "Resolve git conflict markers block by block"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the context and conflict blocks of a file.
    Show {
        /// Conflicted file.
        file: PathBuf,

        /// Print the block model as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check that a file's conflict markers are well formed.
    Check {
        /// Conflicted file.
        file: PathBuf,
    },

    /// Resolve a conflicted file.
    Resolve(ResolveArgs),

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = EngineConfig::load_and_resolve(&config_path);

    let level = config
        .as_ref()
        .map(|c| c.log.level.as_str())
        .unwrap_or("warn");
    init_tracing(level);

    match run(cli.command, &config_path, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    command: Commands,
    config_path: &Path,
    config: Result<EngineConfig, ConfigError>,
) -> Result<()> {
    match command {
        Commands::Init { output } => cmd_init(output.as_deref().unwrap_or(config_path)),
        Commands::Validate => cmd_validate(config_path),
        command => {
            let config = config.context("failed to load configuration")?;
            commands::style::set_colors(config.display.color);

            match command {
                Commands::Show { file, json } => commands::show::run_show(&file, json, &config),
                Commands::Check { file } => commands::show::run_check(&file),
                Commands::Resolve(args) => commands::resolve::run_resolve(&args, &config),
                Commands::Init { .. } | Commands::Validate => unreachable!(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("conflictkit").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("conflictkit.toml"))
}

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, DEFAULT_CONFIG_TEMPLATE).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Pick a default selection for new conflicts (resolve.default_selection)");
    println!(
        "  2. Validate with: conflictkit validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        EngineConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.apply_env_overrides() {
        Ok(()) => println!("  [OK] Environment overrides processed"),
        Err(e) => {
            println!("  [FAIL] Environment override error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Log level         : {}", config.log.level);
    println!(
        "  Default selection : {}",
        config.resolve.default_selection
    );
    println!("  Allow empty       : {}", config.resolve.allow_empty);
    println!("  Show base         : {}", config.display.show_base);
    println!("  Color             : {}", config.display.color);
    println!();
    println!("Configuration is valid.");

    Ok(())
}
