use app::{
    error::{Error, Stage},
    firmware::LocalImage,
    probe::Probe,
    programmer::{Output, Programmer},
    workflow::Session,
};
use chrono::{NaiveDate, NaiveDateTime};
use common::{encode, params::DutyCycle, ParameterSet, FIRMWARE_VERSION};
use fakeprog::{captured, captured_file, CAPTURE_DIR_ENV, EXIT_CODE_ENV, FAIL_ADDRESS_ENV};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

const FAKEPROG: &str = env!("CARGO_BIN_EXE_fakeprog");
const FIRMWARE: &[u8] = b"\x7fELF fake microSWIFT image";

struct Bench {
    root: PathBuf,
}

impl Bench {
    fn new(name: &str) -> Self {
        let root = env::temp_dir().join(format!("swiftcfg-{}-{}", name, process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("firmware.elf"), FIRMWARE).unwrap();
        Self { root }
    }

    fn capture(&self) -> PathBuf {
        self.root.join("capture")
    }

    fn config(&self) -> PathBuf {
        self.root.join("staging").join("config.bin")
    }

    fn session(&self, programmer: Programmer, probe: Option<Probe>) -> Session<Option<Probe>, LocalImage> {
        Session {
            programmer: programmer.env(CAPTURE_DIR_ENV, self.capture()),
            discovery: probe,
            firmware: LocalImage::new(self.root.join("firmware.elf")),
            config_path: self.config(),
            version: FIRMWARE_VERSION,
        }
    }

    fn calls(&self) -> Vec<fakeprog::Invocation> {
        captured(&self.capture()).unwrap()
    }
}

impl Drop for Bench {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn stlink() -> Option<Probe> {
    Some(Probe {
        port: "/dev/ttyACM0".into(),
    })
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 30, 5)
        .unwrap()
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[tokio::test]
async fn firmware_then_config() {
    let bench = Bench::new("success");
    let params = ParameterSet::default();
    let session = bench.session(Programmer::new(FAKEPROG), stlink());

    let mut worker = session.start(&params, noon()).await.unwrap();
    assert_eq!(worker.probe(), &stlink().unwrap());
    let mut lines = Vec::new();
    while let Some(line) = worker.next_output().await {
        lines.push(line);
    }
    worker.finish().await.unwrap();

    let calls = bench.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].address, 0x0800_0000);
    assert!(calls[0].verify);
    assert_eq!(calls[0].start, None);
    assert_eq!(calls[1].address, 0x083F_FC00);
    assert_eq!(calls[1].start, Some(0x0800_0000));

    assert_eq!(read(&captured_file(&bench.capture(), 0x0800_0000)), FIRMWARE);
    let expected = encode(&params, noon(), FIRMWARE_VERSION).unwrap();
    assert_eq!(read(&captured_file(&bench.capture(), 0x083F_FC00)), expected);
    assert!(!bench.config().exists());

    assert!(lines.iter().all(|line| match line {
        Output::Stdout(text) | Output::Stderr(text) => !text.contains('\x1b'),
    }));
    assert!(lines.contains(&Output::Stdout("Download verified successfully".into())));
    assert!(lines.contains(&Output::Stdout(
        "      Copyright \u{fffd} STMicroelectronics (fake)".into()
    )));
}

#[tokio::test]
async fn firmware_failure_skips_config() {
    let bench = Bench::new("fw-fail");
    let programmer = Programmer::new(FAKEPROG)
        .env(FAIL_ADDRESS_ENV, "0x08000000")
        .env(EXIT_CODE_ENV, "3");
    let session = bench.session(programmer, stlink());

    let worker = session.start(&ParameterSet::default(), noon()).await.unwrap();
    match worker.finish().await {
        Err(Error::ExternalTool { stage, status }) => {
            assert_eq!(stage, Stage::Firmware);
            assert_eq!(status.code(), Some(3));
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(bench.calls().len(), 1);
    assert!(!bench.config().exists());
}

#[tokio::test]
async fn config_failure_is_reported() {
    let bench = Bench::new("cfg-fail");
    let programmer = Programmer::new(FAKEPROG).env(FAIL_ADDRESS_ENV, "0x083FFC00");
    let session = bench.session(programmer, stlink());

    let mut worker = session.start(&ParameterSet::default(), noon()).await.unwrap();
    let mut errors = 0;
    while let Some(line) = worker.next_output().await {
        if let Output::Stderr(text) = line {
            assert!(text.starts_with("Error:"));
            errors += 1;
        }
    }
    assert_eq!(errors, 1);
    assert!(matches!(
        worker.finish().await,
        Err(Error::ExternalTool {
            stage: Stage::Config,
            ..
        })
    ));
    assert_eq!(bench.calls().len(), 2);
    assert!(!bench.config().exists());
}

#[tokio::test]
async fn absent_probe() {
    let bench = Bench::new("no-probe");
    let session = bench.session(Programmer::new(FAKEPROG), None);

    let result = session.start(&ParameterSet::default(), noon()).await;
    assert!(matches!(result, Err(Error::DeviceNotPresent)));
    assert!(!bench.config().exists());
    assert!(bench.calls().is_empty());
}

#[tokio::test]
async fn invalid_parameters_write_nothing() {
    let bench = Bench::new("invalid");
    let session = bench.session(Programmer::new(FAKEPROG), stlink());
    let mut params = ParameterSet::default();
    params.duty_cycle_minutes = DutyCycle::new(10).unwrap();

    match session.start(&params, noon()).await {
        Err(Error::Validation(rejected)) => assert!(!rejected.0.is_empty()),
        Err(err) => panic!("unexpected error {}", err),
        Ok(_) => panic!("invalid parameters accepted"),
    }
    assert!(!bench.config().exists());
    assert!(bench.calls().is_empty());
}

#[tokio::test]
async fn missing_firmware_image() {
    let bench = Bench::new("no-image");
    fs::remove_file(bench.root.join("firmware.elf")).unwrap();
    let session = bench.session(Programmer::new(FAKEPROG), stlink());

    let result = session.start(&ParameterSet::default(), noon()).await;
    assert!(matches!(result, Err(Error::Firmware { .. })));
    assert!(!bench.config().exists());
}

#[tokio::test]
async fn missing_programmer_still_cleans_up() {
    let bench = Bench::new("no-programmer");
    let session = bench.session(Programmer::new(bench.root.join("STM32_Programmer_CLI")), stlink());

    let worker = session.start(&ParameterSet::default(), noon()).await.unwrap();
    assert!(matches!(worker.finish().await, Err(Error::Spawn { .. })));
    assert!(!bench.config().exists());
}
