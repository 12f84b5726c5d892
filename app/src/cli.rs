mod defaults;
mod encode;
mod inspect;
mod params;
#[cfg(feature = "probe")]
mod program;
mod verify;

pub use params::ParamArgs;

#[derive(clap::Parser)]
#[command(version, about = "Configure and program microSWIFT buoys", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the default parameter set as JSON
    Defaults(defaults::Args),
    /// Check that the settings fit into the duty cycle
    Verify(verify::Args),
    /// Validate and write the configuration record without programming
    Encode(encode::Args),
    /// Decode a configuration record file
    Inspect(inspect::Args),
    /// Flash firmware and configuration through an STLink probe
    #[cfg(feature = "probe")]
    Program(program::Args),
}

impl Command {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Defaults(cmd) => cmd.run().await,
            Command::Verify(cmd) => cmd.run().await,
            Command::Encode(cmd) => cmd.run().await,
            Command::Inspect(cmd) => cmd.run().await,
            #[cfg(feature = "probe")]
            Command::Program(cmd) => cmd.run().await,
        }
    }
}
