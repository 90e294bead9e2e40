//! ragconsole - Interactive console for a RAG agent
//!
#![doc = "ragconsole - Interactive console for a RAG agent"]
#![doc = "Main entry point for the ragconsole application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragconsole::cli::{Cli, Commands};
use ragconsole::commands;
use ragconsole::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(base_url = %config.backend.base_url, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Chat { no_banner } => {
            let show_banner = config.console.show_banner && !no_banner;
            commands::chat::run_chat(config, show_banner).await?;
            Ok(())
        }
        Commands::Ask { query } => {
            tracing::info!("Sending one-shot query");
            commands::ask::run_ask(config, query).await?;
            Ok(())
        }
        Commands::Ingest { file } => {
            tracing::info!("Uploading {}", file.display());
            commands::ingest::run_ingest(config, file).await?;
            Ok(())
        }
        Commands::Health => {
            commands::health::run_health(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the transcript on
/// stdout. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "ragconsole=debug"
    } else {
        "ragconsole=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
