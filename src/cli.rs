//! Command-line interface definition for profrag
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running the server and talking to it.

use clap::{Parser, Subcommand};

/// profrag - professor recommendations with streamed answers
///
/// Serve the retrieval-augmented chat route, or chat with a running server
/// from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "profrag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for profrag
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP server exposing `POST /api/chat`
    Serve {
        /// Override the bind address from config (e.g. 0.0.0.0:3000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Start an interactive chat session against a running server
    Chat {
        /// Override the chat endpoint URL from config
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Send a single question and print the streamed answer
    Ask {
        /// The question to ask
        message: String,

        /// Override the chat endpoint URL from config
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Print the search criteria extracted from a message, as JSON
    Criteria {
        /// Free text to analyse
        text: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
