use super::params::ParamArgs;
use crate::{
    config::{CONFIG_FILE_PATH, FIRMWARE_IMAGE_PATH, PROGRAMMER_PATH},
    firmware::LocalImage,
    probe::StLink,
    programmer::{Output, Programmer},
    workflow::Session,
};
use chrono::Local;
use common::FIRMWARE_VERSION;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    params: ParamArgs,
    /// STM32CubeProgrammer command line tool
    #[arg(long, default_value = PROGRAMMER_PATH)]
    programmer: PathBuf,
    /// Firmware image flashed before the configuration
    #[arg(long, default_value = FIRMWARE_IMAGE_PATH)]
    firmware: PathBuf,
    /// Staging location of the configuration record
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    config: PathBuf,
}

impl Args {
    pub async fn run(self) -> anyhow::Result<()> {
        let params = self.params.build()?;
        let session = Session {
            programmer: Programmer::new(self.programmer),
            discovery: StLink,
            firmware: LocalImage::new(self.firmware),
            config_path: self.config,
            version: FIRMWARE_VERSION,
        };

        let mut worker = session
            .start(&params, Local::now().naive_local())
            .await?;
        println!("Programming through STLink at {}", worker.probe().port);
        while let Some(line) = worker.next_output().await {
            match line {
                Output::Stdout(text) => println!("{}", text),
                Output::Stderr(text) => eprintln!("{}", text),
            }
        }
        worker.finish().await?;
        println!("Programming complete.");
        Ok(())
    }
}
