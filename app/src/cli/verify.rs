use super::params::ParamArgs;
use anyhow::{bail, Context};
use common::{validate, Verdict};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    params: ParamArgs,
    /// Save the resulting parameter set as JSON, valid or not
    #[arg(long)]
    save: Option<PathBuf>,
}

impl Args {
    pub async fn run(self) -> anyhow::Result<()> {
        let params = self.params.build()?;
        if let Some(path) = &self.save {
            let text = serde_json::to_string_pretty(&params)?;
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Cannot save parameters to {}", path.display()))?;
            log::info!("Parameters saved to {}", path.display());
        }

        println!("Light samples: {}", params.light_samples());
        println!("Turbidity samples: {}", params.turbidity_samples());
        match validate(&params) {
            Verdict::Valid => {
                println!("Settings are valid.");
                Ok(())
            }
            Verdict::Invalid(diagnostics) => {
                for diagnostic in &diagnostics {
                    println!("{}", diagnostic);
                }
                bail!("{} check(s) failed", diagnostics.len())
            }
        }
    }
}
