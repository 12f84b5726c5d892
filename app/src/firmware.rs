use crate::error::Error;
use std::{io, path::PathBuf};

/// Provides the firmware image to flash before the configuration.
pub trait FirmwareSource {
    fn acquire(&self) -> Result<PathBuf, Error>;
}

/// Image bundled next to the tool.
#[derive(Clone, Debug)]
pub struct LocalImage {
    path: PathBuf,
}

impl LocalImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FirmwareSource for LocalImage {
    fn acquire(&self) -> Result<PathBuf, Error> {
        let unavailable = |source| Error::Firmware {
            path: self.path.clone(),
            source,
        };
        let meta = self.path.metadata().map_err(unavailable)?;
        if !meta.is_file() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        log::debug!("Using firmware image {}", self.path.display());
        Ok(self.path.clone())
    }
}
