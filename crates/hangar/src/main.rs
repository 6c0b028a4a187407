// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hangar - a host for out-of-process plugins.
//!
//! This is the binary entry point: it loads configuration, sets up logging
//! and dispatches to the subcommands.

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hangar_config::HangarConfig;

/// Hangar - a host for out-of-process plugins.
#[derive(Parser, Debug)]
#[command(name = "hangar", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Bootstrap from disk, start enabled plugins and run until signalled.
    Serve,
    /// List plugins on disk that are not installed yet.
    Discover,
    /// Install (or refresh) a plugin from disk.
    Import { category: String, plugin_id: String },
    /// Show installed plugins.
    List,
    /// Mark an installation enabled. Takes effect on the next serve.
    Enable { category: String, plugin_id: String },
    /// Mark an installation disabled. Running processes are left alone.
    Disable { category: String, plugin_id: String },
    /// Generate an ed25519 signing keypair.
    Keygen,
    /// Write checksums.json and signature.sig for a plugin directory.
    Sign {
        dir: PathBuf,
        /// Base64-encoded private key.
        #[arg(long)]
        key: String,
    },
    /// Classify a plugin directory against the configured official keys.
    Verify { dir: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> Option<HangarConfig> {
    let loaded = match path {
        Some(path) => hangar_config::load_and_validate_path(path),
        None => hangar_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            hangar_config::render_errors(&errors);
            None
        }
    }
}

/// Crates whose logs follow the configured level; everything else is `warn`.
const LOG_TARGETS: &[&str] = &[
    "hangar",
    "hangar_plugin",
    "hangar_runtime",
    "hangar_adapters",
    "hangar_storage",
    "hangar_verify",
];

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={log_level}")).collect();
        directives.push("warn".to_string());
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Discover => commands::discover(&config).await,
        Commands::Import { category, plugin_id } => commands::import(&config, &category, &plugin_id).await,
        Commands::List => commands::list(&config).await,
        Commands::Enable { category, plugin_id } => {
            commands::set_enabled(&config, &category, &plugin_id, true).await
        }
        Commands::Disable { category, plugin_id } => {
            commands::set_enabled(&config, &category, &plugin_id, false).await
        }
        Commands::Keygen => commands::keygen(),
        Commands::Sign { dir, key } => commands::sign(&dir, &key),
        Commands::Verify { dir } => commands::verify(&config, &dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hangar: {e}");
            ExitCode::FAILURE
        }
    }
}
