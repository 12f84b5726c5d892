pub mod cli;
pub mod config;
pub mod error;
pub mod firmware;
pub mod probe;
pub mod programmer;
pub mod workflow;

mod utils;

pub use error::Error;

pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    cli.command.run().await
}
