use anyhow::{bail, Context};
use common::{
    params::{
        CtSamples, DutyCycle, GnssAcquisitionTime, GnssSampleRate, GnssSamples, IridiumModem,
        IridiumTxTime, LightGainIndex, LightSamples, TempSamples, TrackingNumber, TurbiditySamples,
    },
    values::RangeError,
    LayoutVariant, ParameterSet,
};
use std::path::PathBuf;

fn ranged<T: TryFrom<u32, Error = RangeError>>(s: &str) -> anyhow::Result<T> {
    let value: u32 = s.parse().context("Not an unsigned integer")?;
    Ok(T::try_from(value)?)
}

pub(super) fn layout(s: &str) -> anyhow::Result<LayoutVariant> {
    match s.to_ascii_lowercase().as_str() {
        "a" => Ok(LayoutVariant::A),
        "b" => Ok(LayoutVariant::B),
        _ => bail!("Layout must be 'a' or 'b'"),
    }
}

fn modem(s: &str) -> anyhow::Result<IridiumModem> {
    match s.to_ascii_lowercase().as_str() {
        "v3d" => Ok(IridiumModem::V3D),
        "v3f" => Ok(IridiumModem::V3F),
        _ => bail!("Modem must be 'v3d' or 'v3f'"),
    }
}

/// Settings shared by every subcommand that works on a parameter set.
///
/// Flags override the values loaded from `--params`, or the defaults when no file is given.
/// An explicit sample count takes a sensor out of match-GNSS mode.
#[derive(Debug, clap::Args)]
pub struct ParamArgs {
    /// JSON parameter file to start from
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Record layout the firmware was built with: a (v2.2) or b
    #[arg(long, value_parser(layout))]
    pub layout: Option<LayoutVariant>,

    #[arg(long, value_parser(ranged::<TrackingNumber>))]
    pub tracking_number: Option<TrackingNumber>,
    /// GNSS samples per window
    #[arg(long, value_parser(ranged::<GnssSamples>))]
    pub gnss_samples: Option<GnssSamples>,
    /// GNSS sample rate in Hz (4 or 5)
    #[arg(long, value_parser(ranged::<GnssSampleRate>))]
    pub gnss_rate: Option<GnssSampleRate>,
    /// Max GNSS acquisition time, minutes
    #[arg(long, value_parser(ranged::<GnssAcquisitionTime>))]
    pub gnss_max_acquisition: Option<GnssAcquisitionTime>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub gnss_high_performance: Option<bool>,
    /// Duty cycle, minutes
    #[arg(long, value_parser(ranged::<DutyCycle>))]
    pub duty_cycle: Option<DutyCycle>,
    /// Max Iridium transmit time, minutes
    #[arg(long, value_parser(ranged::<IridiumTxTime>))]
    pub iridium_tx: Option<IridiumTxTime>,
    /// Iridium modem type: v3d or v3f
    #[arg(long, value_parser(modem))]
    pub iridium_modem: Option<IridiumModem>,

    /// Enable the CT sensor
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub ct: Option<bool>,
    #[arg(long, value_parser(ranged::<CtSamples>))]
    pub ct_samples: Option<CtSamples>,
    /// Enable the temperature sensor
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub temperature: Option<bool>,
    #[arg(long, value_parser(ranged::<TempSamples>))]
    pub temp_samples: Option<TempSamples>,

    /// Enable the light sensor
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub light: Option<bool>,
    #[arg(long, value_parser(ranged::<LightSamples>), conflicts_with = "light_match_gnss")]
    pub light_samples: Option<LightSamples>,
    /// Take light samples for the whole GNSS window
    #[arg(long)]
    pub light_match_gnss: bool,
    /// Light sensor gain index (layout b only)
    #[arg(long, value_parser(ranged::<LightGainIndex>))]
    pub light_gain: Option<LightGainIndex>,

    /// Enable the turbidity sensor
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub turbidity: Option<bool>,
    #[arg(
        long,
        value_parser(ranged::<TurbiditySamples>),
        conflicts_with = "turbidity_match_gnss"
    )]
    pub turbidity_samples: Option<TurbiditySamples>,
    /// Take turbidity samples for the whole GNSS window
    #[arg(long)]
    pub turbidity_match_gnss: bool,
}

impl ParamArgs {
    pub fn build(&self) -> anyhow::Result<ParameterSet> {
        let mut params = match &self.params {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Cannot read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid parameter file {}", path.display()))?
            }
            None => ParameterSet::defaults(self.layout.unwrap_or_default()),
        };
        if let Some(layout) = self.layout {
            params.layout = layout;
        }

        if let Some(value) = self.tracking_number {
            params.tracking_number = value;
        }
        if let Some(value) = self.gnss_samples {
            params.gnss_samples_per_window = value;
        }
        if let Some(value) = self.gnss_rate {
            params.gnss_sample_rate = value;
        }
        if let Some(value) = self.gnss_max_acquisition {
            params.gnss_max_acquisition_minutes = value;
        }
        if let Some(value) = self.gnss_high_performance {
            params.gnss_high_performance_mode = value;
        }
        if let Some(value) = self.duty_cycle {
            params.duty_cycle_minutes = value;
        }
        if let Some(value) = self.iridium_tx {
            params.iridium_tx_minutes = value;
        }
        if let Some(value) = self.iridium_modem {
            params.iridium_modem = value;
        }

        if params.layout.sensors_exclusive() && self.ct == Some(true) && self.temperature == Some(true)
        {
            bail!("CT and temperature sensors cannot be enabled together in layout {}", params.layout);
        }
        if let Some(enabled) = self.ct {
            params.set_ct_enabled(enabled);
        }
        if let Some(enabled) = self.temperature {
            params.set_temperature_enabled(enabled);
        }
        if let Some(value) = self.ct_samples {
            params.set_ct_samples(value)?;
        }
        if let Some(value) = self.temp_samples {
            params.set_temp_samples(value)?;
        }

        if let Some(enabled) = self.light {
            params.light_enabled = enabled;
        }
        if self.light_match_gnss {
            params.set_light_match_gnss(true);
        }
        if let Some(value) = self.light_samples {
            params.set_light_match_gnss(false);
            params.set_light_samples(value)?;
        }
        if let Some(value) = self.light_gain {
            params.set_light_gain_index(value)?;
        }

        if let Some(enabled) = self.turbidity {
            params.turbidity_enabled = enabled;
        }
        if self.turbidity_match_gnss {
            params.set_turbidity_match_gnss(true);
        }
        if let Some(value) = self.turbidity_samples {
            params.set_turbidity_match_gnss(false);
            params.set_turbidity_samples(value)?;
        }

        Ok(params)
    }
}
