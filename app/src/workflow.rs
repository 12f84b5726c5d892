use crate::{
    config::OUTPUT_BUFFER_SIZE,
    error::Error,
    firmware::FirmwareSource,
    probe::{Discover, Probe},
    programmer::{Download, Output, Programmer},
};
use chrono::NaiveDateTime;
use common::{encode, validate, FirmwareVersion, ParameterSet};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::{
    fs,
    sync::mpsc::{channel, Receiver},
    task::{spawn, JoinHandle},
};

/// Everything needed to put a parameter set onto a buoy.
pub struct Session<D: Discover, F: FirmwareSource> {
    pub programmer: Programmer,
    pub discovery: D,
    pub firmware: F,
    /// Where the encoded record is staged for the programmer.
    pub config_path: PathBuf,
    pub version: FirmwareVersion,
}

impl<D: Discover, F: FirmwareSource> Session<D, F> {
    /// Checks, stages and starts flashing.
    ///
    /// Every failure returned from here happens before the programmer runs.
    /// Flashing itself goes on in the background, see [`Worker`].
    pub async fn start(&self, params: &ParameterSet, now: NaiveDateTime) -> Result<Worker, Error> {
        validate(params).into_result()?;
        log::info!("Settings are valid");

        let probe = self.discovery.discover()?.ok_or(Error::DeviceNotPresent)?;
        let image = self.firmware.acquire()?;

        let bytes = encode(params, now, self.version)?;
        if let Some(dir) = self.config_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        fs::write(&self.config_path, &bytes).await?;
        log::info!(
            "{} byte configuration written to {}",
            bytes.len(),
            self.config_path.display()
        );

        let (sender, output) = channel(OUTPUT_BUFFER_SIZE);
        let programmer = self.programmer.clone();
        let config = self.config_path.clone();
        let task = spawn(async move {
            let result = async {
                programmer.download(&Download::firmware(image), &sender).await?;
                programmer
                    .download(&Download::config(config.clone()), &sender)
                    .await
            }
            .await;
            remove_staged(&config).await;
            match &result {
                Ok(()) => log::info!("Programming complete"),
                Err(err) => log::error!("{}", err),
            }
            result
        });

        Ok(Worker {
            probe,
            output,
            task,
        })
    }
}

async fn remove_staged(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => (),
        Err(err) => log::warn!("Cannot remove {}: {}", path.display(), err),
    }
}

/// Background flashing job.
///
/// The output channel closes when the job is over, after which [`Worker::finish`] returns at once.
pub struct Worker {
    probe: Probe,
    output: Receiver<Output>,
    task: JoinHandle<Result<(), Error>>,
}

impl Worker {
    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub async fn next_output(&mut self) -> Option<Output> {
        self.output.recv().await
    }

    pub async fn finish(mut self) -> Result<(), Error> {
        while self.output.recv().await.is_some() {}
        self.task.await?
    }
}
