//! Stand-in for `STM32_Programmer_CLI`.
//!
//! Understands the `--connect/--download/--verify/--start` subset used for buoy
//! programming, prints coloured progress like the real tool and, when
//! [`CAPTURE_DIR_ENV`] is set, records every call together with a copy of the
//! downloaded file.

use clap::Parser;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Directory where invocations and downloaded files are captured.
pub const CAPTURE_DIR_ENV: &str = "FAKEPROG_CAPTURE_DIR";
/// Download address at which the fake fails.
pub const FAIL_ADDRESS_ENV: &str = "FAKEPROG_FAIL_ADDRESS";
/// Exit code used on failure, `1` when unset.
pub const EXIT_CODE_ENV: &str = "FAKEPROG_EXIT_CODE";

pub const LOG_FILE: &str = "invocations.log";

#[derive(Debug, Error, Eq, PartialEq)]
#[error("bad address '{0}', expected 0x-prefixed hex")]
pub struct AddressError(pub String);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error(transparent)]
    Address(#[from] AddressError),
}

pub fn parse_address(text: &str) -> Result<u32, AddressError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| AddressError(text.to_string()))?;
    u32::from_str_radix(digits, 16).map_err(|_| AddressError(text.to_string()))
}

/// Command line accepted by the fake, a subset of the vendor tool's.
#[derive(Debug, clap::Parser)]
#[command(name = "STM32_Programmer_CLI", no_binary_name = true)]
struct Args {
    #[arg(short = 'c', long)]
    connect: String,
    #[arg(short = 'd', long, required = true, num_args = 2, value_names = ["FILE", "ADDRESS"])]
    download: Vec<String>,
    #[arg(short = 'v', long)]
    verify: bool,
    #[arg(short = 's', long, value_parser(parse_address))]
    start: Option<u32>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub connect: String,
    pub file: PathBuf,
    pub address: u32,
    pub verify: bool,
    pub start: Option<u32>,
    args: Vec<String>,
}

impl Invocation {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ParseError> {
        let args: Vec<String> = args.into_iter().collect();
        let parsed = Args::try_parse_from(&args)?;
        let [file, address]: [String; 2] = parsed.download.try_into().map_err(|_| {
            clap::Error::raw(
                clap::error::ErrorKind::WrongNumberOfValues,
                "--download takes a file and an address",
            )
        })?;
        Ok(Self {
            connect: parsed.connect,
            file: file.into(),
            address: parse_address(&address)?,
            verify: parsed.verify,
            start: parsed.start,
            args,
        })
    }

    /// Arguments joined with tabs, one invocation per log line.
    pub fn to_line(&self) -> String {
        self.args.join("\t")
    }

    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        Self::parse(line.split('\t').map(String::from))
    }
}

pub fn captured_file(dir: &Path, address: u32) -> PathBuf {
    dir.join(format!("{:#010x}.bin", address))
}

/// Invocations recorded in `dir`, oldest first.
pub fn captured(dir: &Path) -> io::Result<Vec<Invocation>> {
    let text = match fs::read_to_string(dir.join(LOG_FILE)) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    text.lines()
        .filter(|line| !line.is_empty())
        .map(|line| Invocation::from_line(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split(' ').map(String::from).collect()
    }

    #[test]
    fn config_download() {
        let call = Invocation::parse(args(
            "--connect port=SWD --download firmware/config.bin 0x083FFC00 --verify --start 0x08000000",
        ))
        .unwrap();
        assert_eq!(call.connect, "port=SWD");
        assert_eq!(call.file, PathBuf::from("firmware/config.bin"));
        assert_eq!(call.address, 0x083F_FC00);
        assert!(call.verify);
        assert_eq!(call.start, Some(0x0800_0000));
    }

    #[test]
    fn line_keeps_arguments() {
        let call =
            Invocation::parse(args("--connect port=SWD --download fw.elf 0x08000000")).unwrap();
        assert!(!call.verify);
        assert_eq!(call.start, None);
        assert_eq!(Invocation::from_line(&call.to_line()).unwrap(), call);
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Invocation::parse(args("--connect port=SWD")),
            Err(ParseError::Args(_))
        ));
        assert!(matches!(
            Invocation::parse(args("--connect port=SWD --download fw.elf")),
            Err(ParseError::Args(_))
        ));
        assert!(matches!(
            Invocation::parse(args("--connect port=SWD --download fw.elf 134217728")),
            Err(ParseError::Address(AddressError(text))) if text == "134217728"
        ));
        assert!(matches!(
            Invocation::parse(args("--connect port=SWD --download fw.elf 0x0 --start 12")),
            Err(ParseError::Args(_))
        ));
        assert!(matches!(
            Invocation::parse(args("--erase all")),
            Err(ParseError::Args(_))
        ));
    }

    #[test]
    fn short_flags() {
        let call = Invocation::parse(args("-c port=SWD -d fw.elf 0x08000000 -v")).unwrap();
        assert!(call.verify);
        assert_eq!(call.address, 0x0800_0000);
    }

    #[test]
    fn capture_file_name() {
        assert_eq!(
            captured_file(Path::new("out"), 0x083F_FC00),
            Path::new("out").join("0x083ffc00.bin")
        );
    }
}
