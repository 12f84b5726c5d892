use crate::{
    config::{
        GNSS_SAMPLES_MAX, GNSS_SAMPLES_MIN, LIGHT_GAIN_INDEX_MAX, LIGHT_SAMPLES_MAX,
        TURBIDITY_SAMPLES_MAX,
    },
    record::LayoutVariant,
    values::{RangeError, Ranged},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TrackingNumber = Ranged<0, 1000>;
pub type GnssSamples = Ranged<{ GNSS_SAMPLES_MIN }, { GNSS_SAMPLES_MAX }>;
pub type DutyCycle = Ranged<0, 1440>;
pub type IridiumTxTime = Ranged<2, 60>;
pub type GnssAcquisitionTime = Ranged<1, 30>;
pub type CtSamples = Ranged<1, 1000>;
pub type TempSamples = Ranged<1, 1000>;
pub type LightSamples = Ranged<1, { LIGHT_SAMPLES_MAX }>;
pub type TurbiditySamples = Ranged<1, { TURBIDITY_SAMPLES_MAX }>;
pub type LightGainIndex = Ranged<0, { LIGHT_GAIN_INDEX_MAX }>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Display, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GnssSampleRate {
    #[default]
    #[display(fmt = "4 Hz")]
    Hz4,
    #[display(fmt = "5 Hz")]
    Hz5,
}

impl GnssSampleRate {
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz4 => 4,
            Self::Hz5 => 5,
        }
    }
}

impl From<GnssSampleRate> for u32 {
    fn from(rate: GnssSampleRate) -> Self {
        rate.hz()
    }
}

impl TryFrom<u32> for GnssSampleRate {
    type Error = RangeError;
    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            4 => Ok(Self::Hz4),
            5 => Ok(Self::Hz5),
            value => Err(RangeError {
                value,
                min: 4,
                max: 5,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Display, Serialize, Deserialize)]
pub enum IridiumModem {
    #[default]
    V3D,
    V3F,
}

/// Sample count that is either entered by the operator or computed from the GNSS window.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleCount<T> {
    Stored(T),
    MatchGnss,
}

impl<T: Copy + Into<u32>> SampleCount<T> {
    pub fn resolve(self, derived: u32) -> u32 {
        match self {
            Self::Stored(value) => value.into(),
            Self::MatchGnss => derived,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Self::MatchGnss)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ParamError {
    #[error("{0} is derived from the GNSS window while match-GNSS is enabled")]
    Derived(&'static str),
    #[error("{0} does not exist in layout {1}")]
    Unsupported(&'static str, LayoutVariant),
}

/// Snapshot of every operator-configurable setting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub layout: LayoutVariant,

    pub tracking_number: TrackingNumber,
    pub gnss_samples_per_window: GnssSamples,
    pub duty_cycle_minutes: DutyCycle,
    pub iridium_tx_minutes: IridiumTxTime,
    pub gnss_max_acquisition_minutes: GnssAcquisitionTime,
    pub gnss_sample_rate: GnssSampleRate,
    pub gnss_high_performance_mode: bool,
    pub iridium_modem: IridiumModem,

    pub ct_enabled: bool,
    pub ct_samples: CtSamples,
    pub temperature_enabled: bool,
    pub temp_samples: TempSamples,

    pub light_enabled: bool,
    pub light_samples: SampleCount<LightSamples>,
    pub light_gain_index: LightGainIndex,

    pub turbidity_enabled: bool,
    pub turbidity_samples: SampleCount<TurbiditySamples>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::defaults(LayoutVariant::default())
    }
}

impl ParameterSet {
    pub const fn defaults(layout: LayoutVariant) -> Self {
        Self {
            layout,
            tracking_number: Ranged::new_const(100),
            gnss_samples_per_window: Ranged::new_const(4096),
            duty_cycle_minutes: Ranged::new_const(30),
            iridium_tx_minutes: Ranged::new_const(5),
            gnss_max_acquisition_minutes: Ranged::new_const(5),
            gnss_sample_rate: GnssSampleRate::Hz4,
            gnss_high_performance_mode: false,
            iridium_modem: IridiumModem::V3D,
            ct_enabled: false,
            ct_samples: Ranged::new_const(10),
            temperature_enabled: false,
            temp_samples: Ranged::new_const(10),
            light_enabled: false,
            light_samples: SampleCount::Stored(Ranged::new_const(512)),
            light_gain_index: Ranged::new_const(0),
            turbidity_enabled: false,
            turbidity_samples: SampleCount::Stored(Ranged::new_const(1024)),
        }
    }

    pub fn iridium_modem_is_v3f(&self) -> bool {
        self.iridium_modem == IridiumModem::V3F
    }

    /// Enabling CT disables temperature in layout B.
    pub fn set_ct_enabled(&mut self, enabled: bool) {
        self.ct_enabled = enabled;
        if enabled && self.layout.sensors_exclusive() {
            self.temperature_enabled = false;
        }
    }

    /// Enabling temperature disables CT in layout B.
    pub fn set_temperature_enabled(&mut self, enabled: bool) {
        self.temperature_enabled = enabled;
        if enabled && self.layout.sensors_exclusive() {
            self.ct_enabled = false;
        }
    }

    pub fn set_ct_samples(&mut self, samples: CtSamples) -> Result<(), ParamError> {
        match self.layout {
            LayoutVariant::A => {
                self.ct_samples = samples;
                Ok(())
            }
            layout => Err(ParamError::Unsupported("CT sample count", layout)),
        }
    }

    pub fn set_temp_samples(&mut self, samples: TempSamples) -> Result<(), ParamError> {
        match self.layout {
            LayoutVariant::A => {
                self.temp_samples = samples;
                Ok(())
            }
            layout => Err(ParamError::Unsupported("temperature sample count", layout)),
        }
    }

    pub fn set_light_gain_index(&mut self, index: LightGainIndex) -> Result<(), ParamError> {
        match self.layout {
            LayoutVariant::B => {
                self.light_gain_index = index;
                Ok(())
            }
            layout => Err(ParamError::Unsupported("light gain index", layout)),
        }
    }

    pub fn set_light_samples(&mut self, samples: LightSamples) -> Result<(), ParamError> {
        if self.light_samples.is_derived() {
            return Err(ParamError::Derived("light sample count"));
        }
        self.light_samples = SampleCount::Stored(samples);
        Ok(())
    }

    pub fn set_turbidity_samples(&mut self, samples: TurbiditySamples) -> Result<(), ParamError> {
        if self.turbidity_samples.is_derived() {
            return Err(ParamError::Derived("turbidity sample count"));
        }
        self.turbidity_samples = SampleCount::Stored(samples);
        Ok(())
    }

    /// Leaving match mode keeps the last derived value, clamped to the field range.
    pub fn set_light_match_gnss(&mut self, matched: bool) {
        self.light_samples = if matched {
            SampleCount::MatchGnss
        } else {
            SampleCount::Stored(Ranged::saturating(self.light_samples()))
        };
    }

    pub fn set_turbidity_match_gnss(&mut self, matched: bool) {
        self.turbidity_samples = if matched {
            SampleCount::MatchGnss
        } else {
            SampleCount::Stored(Ranged::saturating(self.turbidity_samples()))
        };
    }

    pub fn light_match_gnss(&self) -> bool {
        self.light_samples.is_derived()
    }

    pub fn turbidity_match_gnss(&self) -> bool {
        self.turbidity_samples.is_derived()
    }

    /// Light samples at 0.5 Hz covering the GNSS window.
    pub fn gnss_derived_light_samples(&self) -> u32 {
        self.gnss_derived_turbidity_samples() / 2
    }

    /// Turbidity samples at 1 Hz covering the GNSS window.
    pub fn gnss_derived_turbidity_samples(&self) -> u32 {
        self.gnss_samples_per_window.get() / self.gnss_sample_rate.hz()
    }

    pub fn light_samples(&self) -> u32 {
        self.light_samples.resolve(self.gnss_derived_light_samples())
    }

    pub fn turbidity_samples(&self) -> u32 {
        self.turbidity_samples.resolve(self.gnss_derived_turbidity_samples())
    }
}
