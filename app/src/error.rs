use common::{record::EncodeError, validate::Rejected};
use derive_more::Display;
use std::{io, path::PathBuf, process::ExitStatus};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum Stage {
    #[display(fmt = "firmware")]
    Firmware,
    #[display(fmt = "configuration")]
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Settings are not valid:\n{0}")]
    Validation(#[from] Rejected),
    #[error("Cannot encode configuration: {0}")]
    Encode(#[from] EncodeError),
    #[error("STLink programmer not detected.")]
    DeviceNotPresent,
    #[cfg(feature = "probe")]
    #[error("USB port enumeration failed: {0}")]
    Discovery(#[from] tokio_serial::Error),
    #[error("Firmware image {} is unavailable: {source}", path.display())]
    Firmware {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot run programmer {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Programming {stage} failed ({status})")]
    ExternalTool { stage: Stage, status: ExitStatus },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Programming worker stopped: {0}")]
    Worker(#[from] JoinError),
}
