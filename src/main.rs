//! msgbench: HTTP load-test driver for messaging backends

mod cli;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use msgbench_core::{run_batch, JobDescriptor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            endpoint,
            target,
            token,
            tech,
            scenario,
            count,
            concurrency,
        } => {
            let job = JobDescriptor {
                tech,
                scenario,
                count,
                target,
                concurrency,
                endpoint,
                token,
            };

            let batch = run_batch(job).await?;
            let payload = server::RunResponse::from(batch);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Serve { port } => {
            server::serve(port).await?;
        }
    }

    Ok(())
}
