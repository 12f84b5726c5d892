use super::params::ParamArgs;
use crate::config::CONFIG_FILE_PATH;
use anyhow::Context;
use chrono::Local;
use common::{encode, validate, FIRMWARE_VERSION};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    params: ParamArgs,
    /// Where to write the record
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    out: PathBuf,
}

impl Args {
    pub async fn run(self) -> anyhow::Result<()> {
        let params = self.params.build()?;
        validate(&params).into_result()?;

        let bytes = encode(&params, Local::now().naive_local(), FIRMWARE_VERSION)?;
        if let Some(dir) = self.out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.out, &bytes)
            .await
            .with_context(|| format!("Cannot write {}", self.out.display()))?;
        println!(
            "{} bytes (layout {}) written to {}",
            bytes.len(),
            params.layout,
            self.out.display()
        );
        Ok(())
    }
}
