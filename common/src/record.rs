//! Packed configuration record read by the firmware from its `.uservars` flash section.
//!
//! Fields are little-endian with no padding. A `bool` takes a whole byte. Date and time
//! are fixed-width, null-terminated ASCII.

use crate::{
    config::{DATE_FORMAT, DATE_LEN, TIME_FORMAT, TIME_LEN},
    params::ParameterSet,
};
use chrono::NaiveDateTime;
use derive_more::Display;
use flatty::{
    flat,
    portable::{le, Bool},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Struct layout the target firmware was built with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
pub enum LayoutVariant {
    /// CT and temperature sample counts plus a version byte.
    #[default]
    A,
    /// Light gain index, no version byte.
    B,
}

const FLAG_COUNT: usize = 6;

/// `.uservars` image of firmware built with layout A.
#[flat(portable = true)]
#[derive(Clone, Copy, Debug)]
struct UserVarsA {
    tracking_number: le::U32,
    gnss_samples_per_window: le::U32,
    duty_cycle: le::U32,
    iridium_max_transmit_time: le::U32,
    gnss_max_acquisition_wait_time: le::U32,
    gnss_sampling_rate: le::U32,
    ct_samples: le::U32,
    temp_samples: le::U32,
    light_samples: le::U32,
    turbidity_samples: le::U32,
    flags: [Bool; FLAG_COUNT],
    version: u8,
    compile_date: [u8; DATE_LEN],
    compile_time: [u8; TIME_LEN],
}

/// `.uservars` image of firmware built with layout B.
#[flat(portable = true)]
#[derive(Clone, Copy, Debug)]
struct UserVarsB {
    tracking_number: le::U32,
    gnss_samples_per_window: le::U32,
    duty_cycle: le::U32,
    iridium_max_transmit_time: le::U32,
    gnss_max_acquisition_wait_time: le::U32,
    gnss_sampling_rate: le::U32,
    light_samples: le::U32,
    light_gain_index: le::U32,
    turbidity_samples: le::U32,
    flags: [Bool; FLAG_COUNT],
    compile_date: [u8; DATE_LEN],
    compile_time: [u8; TIME_LEN],
}

impl LayoutVariant {
    /// CT and temperature cannot run together.
    pub const fn sensors_exclusive(self) -> bool {
        matches!(self, Self::B)
    }

    /// Exact record length in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::A => UserVarsA::SIZE,
            Self::B => UserVarsB::SIZE,
        }
    }

    pub fn from_size(size: usize) -> Option<Self> {
        [Self::A, Self::B]
            .into_iter()
            .find(|layout| layout.size() == size)
    }
}

/// Single byte with the major revision in the low nibble and the minor in the high one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
#[display(fmt = "{}.{}", major, minor)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    const NIBBLE_MAX: u8 = 0xf;

    pub fn to_byte(self) -> Result<u8, EncodeError> {
        if self.major > Self::NIBBLE_MAX || self.minor > Self::NIBBLE_MAX {
            return Err(EncodeError::Version(self));
        }
        Ok(self.major | (self.minor << 4))
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            major: byte & Self::NIBBLE_MAX,
            minor: byte >> 4,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EncodeError {
    #[error("firmware version {0} does not fit into a nibble pair")]
    Version(FirmwareVersion),
    #[error("{field} '{text}' does not fit into {capacity} bytes with its terminator")]
    Text {
        field: &'static str,
        text: String,
        capacity: usize,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("record must be {expected} bytes long, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("record is malformed at offset {}: {:?}", .0.pos, .0.kind)]
    Malformed(flatty::Error),
    #[error("{0} is not null-terminated")]
    Unterminated(&'static str),
    #[error("{0} is not ASCII")]
    NotAscii(&'static str),
}

/// Counts that exist in only one of the layouts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutFields {
    A {
        ct_samples: u32,
        temp_samples: u32,
        version: FirmwareVersion,
    },
    B {
        light_gain_index: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Flags {
    pub iridium_v3f: bool,
    pub gnss_high_performance_mode: bool,
    pub ct_enabled: bool,
    pub temperature_enabled: bool,
    pub light_enabled: bool,
    pub turbidity_enabled: bool,
}

impl Flags {
    fn to_array(self) -> [Bool; FLAG_COUNT] {
        [
            self.iridium_v3f,
            self.gnss_high_performance_mode,
            self.ct_enabled,
            self.temperature_enabled,
            self.light_enabled,
            self.turbidity_enabled,
        ]
        .map(Bool::from)
    }

    fn from_array(flags: [Bool; FLAG_COUNT]) -> Self {
        let flags = flags.map(bool::from);
        Self {
            iridium_v3f: flags[0],
            gnss_high_performance_mode: flags[1],
            ct_enabled: flags[2],
            temperature_enabled: flags[3],
            light_enabled: flags[4],
            turbidity_enabled: flags[5],
        }
    }
}

/// Field-level view of an encoded record, with derived counts already resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigRecord {
    pub tracking_number: u32,
    pub gnss_samples_per_window: u32,
    pub duty_cycle: u32,
    pub iridium_max_transmit_time: u32,
    pub gnss_max_acquisition_wait_time: u32,
    pub gnss_sampling_rate: u32,
    pub light_samples: u32,
    pub turbidity_samples: u32,
    pub layout_fields: LayoutFields,
    pub flags: Flags,
    pub compile_date: String,
    pub compile_time: String,
}

impl ConfigRecord {
    pub fn new(params: &ParameterSet, now: NaiveDateTime, version: FirmwareVersion) -> Self {
        let layout_fields = match params.layout {
            LayoutVariant::A => LayoutFields::A {
                ct_samples: params.ct_samples.get(),
                temp_samples: params.temp_samples.get(),
                version,
            },
            LayoutVariant::B => LayoutFields::B {
                light_gain_index: params.light_gain_index.get(),
            },
        };
        Self {
            tracking_number: params.tracking_number.get(),
            gnss_samples_per_window: params.gnss_samples_per_window.get(),
            duty_cycle: params.duty_cycle_minutes.get(),
            iridium_max_transmit_time: params.iridium_tx_minutes.get(),
            gnss_max_acquisition_wait_time: params.gnss_max_acquisition_minutes.get(),
            gnss_sampling_rate: params.gnss_sample_rate.hz(),
            light_samples: params.light_samples(),
            turbidity_samples: params.turbidity_samples(),
            layout_fields,
            flags: Flags {
                iridium_v3f: params.iridium_modem_is_v3f(),
                gnss_high_performance_mode: params.gnss_high_performance_mode,
                ct_enabled: params.ct_enabled,
                temperature_enabled: params.temperature_enabled,
                light_enabled: params.light_enabled,
                turbidity_enabled: params.turbidity_enabled,
            },
            compile_date: now.format(DATE_FORMAT).to_string(),
            compile_time: now.format(TIME_FORMAT).to_string(),
        }
    }

    pub fn layout(&self) -> LayoutVariant {
        match self.layout_fields {
            LayoutFields::A { .. } => LayoutVariant::A,
            LayoutFields::B { .. } => LayoutVariant::B,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let flags = self.flags.to_array();
        let compile_date = put_text("compile date", &self.compile_date)?;
        let compile_time = put_text("compile time", &self.compile_time)?;
        let bytes = match self.layout_fields {
            LayoutFields::A {
                ct_samples,
                temp_samples,
                version,
            } => UserVarsA {
                tracking_number: self.tracking_number.into(),
                gnss_samples_per_window: self.gnss_samples_per_window.into(),
                duty_cycle: self.duty_cycle.into(),
                iridium_max_transmit_time: self.iridium_max_transmit_time.into(),
                gnss_max_acquisition_wait_time: self.gnss_max_acquisition_wait_time.into(),
                gnss_sampling_rate: self.gnss_sampling_rate.into(),
                ct_samples: ct_samples.into(),
                temp_samples: temp_samples.into(),
                light_samples: self.light_samples.into(),
                turbidity_samples: self.turbidity_samples.into(),
                flags,
                version: version.to_byte()?,
                compile_date,
                compile_time,
            }
            .as_bytes()
            .to_vec(),
            LayoutFields::B { light_gain_index } => UserVarsB {
                tracking_number: self.tracking_number.into(),
                gnss_samples_per_window: self.gnss_samples_per_window.into(),
                duty_cycle: self.duty_cycle.into(),
                iridium_max_transmit_time: self.iridium_max_transmit_time.into(),
                gnss_max_acquisition_wait_time: self.gnss_max_acquisition_wait_time.into(),
                gnss_sampling_rate: self.gnss_sampling_rate.into(),
                light_samples: self.light_samples.into(),
                light_gain_index: light_gain_index.into(),
                turbidity_samples: self.turbidity_samples.into(),
                flags,
                compile_date,
                compile_time,
            }
            .as_bytes()
            .to_vec(),
        };
        debug_assert_eq!(bytes.len(), self.layout().size());
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8], layout: LayoutVariant) -> Result<Self, DecodeError> {
        if bytes.len() != layout.size() {
            return Err(DecodeError::Length {
                expected: layout.size(),
                actual: bytes.len(),
            });
        }
        match layout {
            LayoutVariant::A => {
                let vars = UserVarsA::from_bytes(bytes).map_err(DecodeError::Malformed)?;
                Ok(Self {
                    tracking_number: vars.tracking_number.to_native(),
                    gnss_samples_per_window: vars.gnss_samples_per_window.to_native(),
                    duty_cycle: vars.duty_cycle.to_native(),
                    iridium_max_transmit_time: vars.iridium_max_transmit_time.to_native(),
                    gnss_max_acquisition_wait_time: vars.gnss_max_acquisition_wait_time.to_native(),
                    gnss_sampling_rate: vars.gnss_sampling_rate.to_native(),
                    light_samples: vars.light_samples.to_native(),
                    turbidity_samples: vars.turbidity_samples.to_native(),
                    layout_fields: LayoutFields::A {
                        ct_samples: vars.ct_samples.to_native(),
                        temp_samples: vars.temp_samples.to_native(),
                        version: FirmwareVersion::from_byte(vars.version),
                    },
                    flags: Flags::from_array(vars.flags),
                    compile_date: get_text("compile date", &vars.compile_date)?,
                    compile_time: get_text("compile time", &vars.compile_time)?,
                })
            }
            LayoutVariant::B => {
                let vars = UserVarsB::from_bytes(bytes).map_err(DecodeError::Malformed)?;
                Ok(Self {
                    tracking_number: vars.tracking_number.to_native(),
                    gnss_samples_per_window: vars.gnss_samples_per_window.to_native(),
                    duty_cycle: vars.duty_cycle.to_native(),
                    iridium_max_transmit_time: vars.iridium_max_transmit_time.to_native(),
                    gnss_max_acquisition_wait_time: vars.gnss_max_acquisition_wait_time.to_native(),
                    gnss_sampling_rate: vars.gnss_sampling_rate.to_native(),
                    light_samples: vars.light_samples.to_native(),
                    turbidity_samples: vars.turbidity_samples.to_native(),
                    layout_fields: LayoutFields::B {
                        light_gain_index: vars.light_gain_index.to_native(),
                    },
                    flags: Flags::from_array(vars.flags),
                    compile_date: get_text("compile date", &vars.compile_date)?,
                    compile_time: get_text("compile time", &vars.compile_time)?,
                })
            }
        }
    }
}

/// Packs a validated parameter set. Validation is the caller's job.
pub fn encode(
    params: &ParameterSet,
    now: NaiveDateTime,
    version: FirmwareVersion,
) -> Result<Vec<u8>, EncodeError> {
    ConfigRecord::new(params, now, version).to_bytes()
}

/// Null-padded ASCII, at least one terminator.
fn put_text<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N], EncodeError> {
    if !text.is_ascii() || text.len() >= N {
        return Err(EncodeError::Text {
            field,
            text: text.into(),
            capacity: N,
        });
    }
    let mut raw = [0; N];
    raw[..text.len()].copy_from_slice(text.as_bytes());
    Ok(raw)
}

fn get_text<const N: usize>(field: &'static str, raw: &[u8; N]) -> Result<String, DecodeError> {
    let end = raw
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::Unterminated(field))?;
    let text = &raw[..end];
    if !text.is_ascii() {
        return Err(DecodeError::NotAscii(field));
    }
    Ok(text.iter().map(|&b| b as char).collect())
}
