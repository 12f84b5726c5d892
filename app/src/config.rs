pub const CONFIG_FILE_PATH: &str = "firmware/config.bin";
pub const FIRMWARE_IMAGE_PATH: &str = "firmware/microSWIFT_V2.2.elf";

pub const FIRMWARE_ADDRESS: u32 = 0x0800_0000;
/// Start of the `.uservars` section.
pub const CONFIG_ADDRESS: u32 = 0x083F_FC00;

pub const PROBE_CONNECTION: &str = "port=SWD";
pub const PROBE_USB_VID: u16 = 0x0483;
pub const PROBE_USB_PID: u16 = 0x374E;

#[cfg(target_os = "macos")]
pub const PROGRAMMER_PATH: &str = "/Applications/STMicroelectronics/STM32Cube/STM32CubeProgrammer/\
    STM32CubeProgrammer.app/Contents/MacOs/bin/STM32_Programmer_CLI";
#[cfg(target_os = "windows")]
pub const PROGRAMMER_PATH: &str =
    "C:\\Program Files\\STMicroelectronics\\STM32Cube\\STM32CubeProgrammer\\bin\\STM32_Programmer_CLI.exe";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const PROGRAMMER_PATH: &str = "STM32_Programmer_CLI";

pub const OUTPUT_BUFFER_SIZE: usize = 64;
