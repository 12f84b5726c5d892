use core::time::Duration;

pub const FIRMWARE_MAJOR_VERSION: u8 = 2;
pub const FIRMWARE_MINOR_VERSION: u8 = 2;

pub const GNSS_SAMPLES_MIN: u32 = 1024;
pub const GNSS_SAMPLES_MAX: u32 = 32768;

pub const LIGHT_SAMPLES_MAX: u32 = 1800;
pub const TURBIDITY_SAMPLES_MAX: u32 = 3600;
pub const LIGHT_GAIN_INDEX_MAX: u32 = 10;

/// Light sensor runs at 0.5 Hz.
pub const LIGHT_SAMPLES_PER_MINUTE: u32 = 30;
/// Turbidity sensor runs at 1 Hz.
pub const TURBIDITY_SAMPLES_PER_MINUTE: u32 = 60;

/// Added to every sensor window.
pub const WINDOW_MARGIN_MINUTES: u32 = 1;

pub const CT_SAMPLE_PERIOD: Duration = Duration::from_secs(2);
pub const CT_WARMUP: Duration = Duration::from_secs(20);
pub const CT_MAX_WINDOW: Duration = Duration::from_secs(2 * 60);

pub const DATE_LEN: usize = 11;
pub const TIME_LEN: usize = 9;

pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";
