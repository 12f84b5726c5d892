use crate::{
    config::{CONFIG_ADDRESS, FIRMWARE_ADDRESS, PROBE_CONNECTION},
    error::{Error, Stage},
    utils::ansi,
};
use futures::try_join;
use std::{
    ffi::{OsStr, OsString},
    io,
    path::PathBuf,
    process::Stdio,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    sync::mpsc::Sender,
};

/// Line printed by the programmer, escape codes removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Output {
    Stdout(String),
    Stderr(String),
}

/// One `--download` run of the vendor programmer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Download {
    pub stage: Stage,
    pub file: PathBuf,
    pub address: u32,
    pub verify: bool,
    pub start: Option<u32>,
}

impl Download {
    pub fn firmware(image: PathBuf) -> Self {
        Self {
            stage: Stage::Firmware,
            file: image,
            address: FIRMWARE_ADDRESS,
            verify: true,
            start: None,
        }
    }

    /// Starts the firmware once the configuration is verified.
    pub fn config(file: PathBuf) -> Self {
        Self {
            stage: Stage::Config,
            file,
            address: CONFIG_ADDRESS,
            verify: true,
            start: Some(FIRMWARE_ADDRESS),
        }
    }
}

fn hex(address: u32) -> OsString {
    format!("{:#010X}", address).replacen("0X", "0x", 1).into()
}

#[derive(Clone, Debug)]
pub struct Programmer {
    path: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl Programmer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            envs: Vec::new(),
        }
    }

    /// Extra environment variable for the programmer process.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }

    pub fn args(&self, job: &Download) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--connect".into(),
            PROBE_CONNECTION.into(),
            "--download".into(),
            job.file.clone().into(),
            hex(job.address),
        ];
        if job.verify {
            args.push("--verify".into());
        }
        if let Some(start) = job.start {
            args.push("--start".into());
            args.push(hex(start));
        }
        args
    }

    /// Runs the programmer to completion, forwarding its output line by line.
    pub async fn download(&self, job: &Download, output: &Sender<Output>) -> Result<(), Error> {
        log::info!(
            "Writing {} {} to {:#010x}",
            job.stage,
            job.file.display(),
            job.address
        );
        let mut child = Command::new(&self.path)
            .args(self.args(job))
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let (stdout, stderr) = (child.stdout.take(), child.stderr.take());
        let (status, (), ()) = try_join!(
            child.wait(),
            forward(stdout, Output::Stdout, output),
            forward(stderr, Output::Stderr, output),
        )?;

        if status.success() {
            log::info!("{} written", job.stage);
            Ok(())
        } else {
            log::warn!("Programmer exited with {} while writing {}", status, job.stage);
            Err(Error::ExternalTool {
                stage: job.stage,
                status,
            })
        }
    }
}

/// Lines are decoded lossily: the tool prints in the console code page, which need not be UTF-8.
async fn forward<R: AsyncRead + Unpin>(
    stream: Option<R>,
    wrap: fn(String) -> Output,
    output: &Sender<Output>,
) -> io::Result<()> {
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut lines = BufReader::new(stream).split(b'\n');
    while let Some(raw) = lines.next_segment().await? {
        let raw = raw.strip_suffix(b"\r").unwrap_or(&raw);
        let line = ansi::strip(&String::from_utf8_lossy(raw));
        log::debug!("programmer: {}", line);
        // Nobody listening is not a reason to stop the programmer halfway.
        let _ = output.send(wrap(line)).await;
    }
    Ok(())
}
