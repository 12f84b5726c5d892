use fakeprog::{
    captured_file, parse_address, Invocation, CAPTURE_DIR_ENV, EXIT_CODE_ENV, FAIL_ADDRESS_ENV,
    LOG_FILE,
};
use std::{
    env, fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};

const BLUE: &str = "\x1b[01;34m";
const GREEN: &str = "\x1b[01;32m";
const RED: &str = "\x1b[01;31m";
const RESET: &str = "\x1b[0m";

fn record(dir: &Path, call: &Invocation) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut log = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    writeln!(log, "{}", call.to_line())?;
    fs::copy(&call.file, captured_file(dir, call.address))?;
    Ok(())
}

fn fails_at(address: u32) -> bool {
    env::var(FAIL_ADDRESS_ENV)
        .ok()
        .and_then(|text| parse_address(&text).ok())
        == Some(address)
}

fn exit_code() -> u8 {
    env::var(EXIT_CODE_ENV)
        .ok()
        .and_then(|text| text.parse().ok())
        .unwrap_or(1)
}

fn main() -> ExitCode {
    println!("{}      -------------------------------------------------------------------{}", BLUE, RESET);
    println!("{}                        STM32CubeProgrammer (fake){}", BLUE, RESET);
    println!("{}      -------------------------------------------------------------------{}", BLUE, RESET);
    // Windows consoles print the banner in a legacy code page.
    let _ = io::stdout().write_all(b"      Copyright \xa9 STMicroelectronics (fake)\r\n");

    let call = match Invocation::parse(env::args().skip(1)) {
        Ok(call) => call,
        Err(err) => {
            eprintln!("{}Error: {}{}", RED, err, RESET);
            return ExitCode::from(exit_code());
        }
    };
    println!("ST-LINK SN  : FAKE0000");
    println!("Connect     : {}", call.connect);

    if let Some(dir) = env::var_os(CAPTURE_DIR_ENV) {
        if let Err(err) = record(Path::new(&dir), &call) {
            eprintln!("{}Error: cannot capture download: {}{}", RED, err, RESET);
            return ExitCode::from(exit_code());
        }
    }

    println!("Memory Programming ...");
    println!("Opening and parsing file: {}", call.file.display());
    println!("  Address     : {:#010x}", call.address);
    if fails_at(call.address) {
        eprintln!("{}Error: failed to download Segment[0]{}", RED, RESET);
        return ExitCode::from(exit_code());
    }
    println!("{}File download complete{}", GREEN, RESET);
    if call.verify {
        println!("{}Download verified successfully{}", GREEN, RESET);
    }
    if let Some(start) = call.start {
        println!("MCU Reset");
        println!("{}Start operation achieved successfully at {:#010x}{}", GREEN, start, RESET);
    }
    ExitCode::SUCCESS
}
