pub mod config;
pub mod params;
pub mod record;
pub mod validate;
pub mod values;

pub use params::ParameterSet;
pub use record::{encode, ConfigRecord, FirmwareVersion, LayoutVariant};
pub use validate::{validate, Verdict};

pub const FIRMWARE_VERSION: FirmwareVersion = FirmwareVersion {
    major: config::FIRMWARE_MAJOR_VERSION,
    minor: config::FIRMWARE_MINOR_VERSION,
};
