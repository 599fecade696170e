//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: route a question through the router agent
//! - python / csv / search: talk to one agent directly
//! - tools: list the router's tools

use agent_router::config::LlmProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agent-router - route natural-language requests to tool-using agents
#[derive(Parser, Debug)]
#[command(name = "agent-router")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM provider, overriding the config file
    #[arg(short, long, global = true, value_enum)]
    pub provider: Option<LlmProvider>,

    /// CSV file for the csv agent, overriding the config file
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    /// Subcommand to execute; without one the demo request runs through the router
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the router, which picks the python or csv agent
    Ask {
        /// Natural-language request
        question: String,
    },

    /// Have the python agent write and run code for a task
    Python {
        /// Task description
        task: String,
    },

    /// Ask the csv agent a question about the CSV file
    Csv {
        /// Question about the data
        question: String,
    },

    /// Ask the search agent, which can search the web and multiply
    Search {
        /// Question to research
        question: String,
    },

    /// List the router's tools and their descriptions
    Tools,
}
