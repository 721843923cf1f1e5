//! Command-line interface definitions

use clap::{Parser, Subcommand};

use msgbench_core::Scenario;

/// HTTP load-test driver for messaging backends
#[derive(Parser, Debug)]
#[command(name = "msgbench", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one load-test batch and print the metrics as JSON
    Run {
        /// Base URL of the system under test
        #[arg(long)]
        endpoint: String,

        /// Target identifier embedded in generated URLs
        #[arg(long)]
        target: String,

        /// Bearer token sent with every request
        #[arg(long, default_value = "")]
        token: String,

        /// Label for the backend technology under test
        #[arg(long, default_value = "unknown")]
        tech: String,

        /// Request scenario: get, post, or mixed
        #[arg(long, default_value = "get")]
        scenario: Scenario,

        /// Total number of requests to issue
        #[arg(long, default_value_t = 100)]
        count: usize,

        /// Maximum number of requests in flight at once
        #[arg(long, default_value_t = 10)]
        concurrency: usize,
    },

    /// Serve the load-test HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8090)]
        port: u16,
    },
}
