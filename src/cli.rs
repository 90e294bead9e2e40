//! Command-line interface definition for ragconsole
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive console plus one-shot query, ingest and
//! health commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragconsole - Interactive console for a RAG agent
///
/// Ask questions against indexed documents and upload new documents
/// for indexing.
#[derive(Parser, Debug, Clone)]
#[command(name = "ragconsole")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Base URL of the RAG backend (overrides RAG_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ragconsole
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive console
    Chat {
        /// Do not show the welcome banner
        #[arg(long)]
        no_banner: bool,
    },

    /// Send a single query and print the reply
    Ask {
        /// Query text
        query: String,
    },

    /// Upload a single document for indexing
    Ingest {
        /// Path to the document
        file: PathBuf,
    },

    /// Check that the backend is reachable
    Health,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            command: Commands::Chat { no_banner: false },
        }
    }
}
