//! Timing-budget checks run before a parameter set may be encoded.
//!
//! Every rule is evaluated and every failure is reported. The arithmetic is done in
//! whole numbers on `i64`, so the inequalities are exact and cannot overflow for any
//! in-range [`ParameterSet`].

use crate::{
    config::{
        CT_MAX_WINDOW, CT_SAMPLE_PERIOD, CT_WARMUP, LIGHT_SAMPLES_MAX, LIGHT_SAMPLES_PER_MINUTE,
        TURBIDITY_SAMPLES_MAX, TURBIDITY_SAMPLES_PER_MINUTE, WINDOW_MARGIN_MINUTES,
    },
    params::ParameterSet,
    record::LayoutVariant,
};
use derive_more::Display;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum Diagnostic {
    #[display(fmt = "Duty cycle not long enough to complete GNSS sample window.")]
    GnssWindow,
    #[display(fmt = "CT sampling window greater than allotted time of 2 mins.")]
    CtWindow,
    #[display(fmt = "Duty cycle not long enough to complete Light sample window.")]
    LightWindow,
    #[display(fmt = "Max number of light samples is {}.", LIGHT_SAMPLES_MAX)]
    LightCeiling,
    #[display(fmt = "Duty cycle not long enough to complete Turbidity sample window.")]
    TurbidityWindow,
    #[display(fmt = "Max number of turbidity samples is {}.", TURBIDITY_SAMPLES_MAX)]
    TurbidityCeiling,
    #[display(fmt = "CT and temperature sensors cannot be enabled together.")]
    CtTemperatureConflict,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    Valid,
    Invalid(Vec<Diagnostic>),
}

/// Settings rejected by [`validate`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{}", lines(.0))]
pub struct Rejected(pub Vec<Diagnostic>);

fn lines(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Verdict::Valid => &[],
            Verdict::Invalid(diagnostics) => diagnostics,
        }
    }

    pub fn into_result(self) -> Result<(), Rejected> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Invalid(diagnostics) => Err(Rejected(diagnostics)),
        }
    }
}

/// Whole minutes needed to collect the GNSS window, rounded up.
pub fn gnss_sampling_minutes(params: &ParameterSet) -> u32 {
    let samples_per_minute = params.gnss_sample_rate.hz() * 60;
    params
        .gnss_samples_per_window
        .get()
        .div_ceil(samples_per_minute)
}

/// GNSS sampling time plus margin plus the time allowed for a fix.
pub fn gnss_duration_minutes(params: &ParameterSet) -> u32 {
    gnss_sampling_minutes(params)
        + WINDOW_MARGIN_MINUTES
        + params.gnss_max_acquisition_minutes.get()
}

/// Minutes left in the duty cycle once the margin and the Iridium transmission are taken out.
fn sensor_budget_minutes(params: &ParameterSet) -> i64 {
    params.duty_cycle_minutes.get() as i64
        - WINDOW_MARGIN_MINUTES as i64
        - params.iridium_tx_minutes.get() as i64
}

fn gnss_window_fits(params: &ParameterSet) -> bool {
    params.duty_cycle_minutes.get() as i64
        - gnss_duration_minutes(params) as i64
        - params.iridium_tx_minutes.get() as i64
        >= 0
}

fn ct_window_fits(params: &ParameterSet) -> bool {
    let window = CT_SAMPLE_PERIOD.as_secs() * params.ct_samples.get() as u64 + CT_WARMUP.as_secs();
    window <= CT_MAX_WINDOW.as_secs()
}

fn sensor_window_fits(samples: u32, samples_per_minute: u32, params: &ParameterSet) -> bool {
    samples as i64 <= samples_per_minute as i64 * sensor_budget_minutes(params)
}

pub fn validate(params: &ParameterSet) -> Verdict {
    let mut diagnostics = Vec::new();

    if !gnss_window_fits(params) {
        diagnostics.push(Diagnostic::GnssWindow);
    }

    match params.layout {
        LayoutVariant::A => {
            if params.ct_enabled && !ct_window_fits(params) {
                diagnostics.push(Diagnostic::CtWindow);
            }
        }
        LayoutVariant::B => {
            if params.ct_enabled && params.temperature_enabled {
                diagnostics.push(Diagnostic::CtTemperatureConflict);
            }
        }
    }

    if params.light_enabled {
        if !sensor_window_fits(params.light_samples(), LIGHT_SAMPLES_PER_MINUTE, params) {
            diagnostics.push(Diagnostic::LightWindow);
        }
        // Checked against the GNSS window even when the count is entered manually.
        if params.gnss_derived_light_samples() > LIGHT_SAMPLES_MAX {
            diagnostics.push(Diagnostic::LightCeiling);
        }
    }

    if params.turbidity_enabled {
        if !sensor_window_fits(
            params.turbidity_samples(),
            TURBIDITY_SAMPLES_PER_MINUTE,
            params,
        ) {
            diagnostics.push(Diagnostic::TurbidityWindow);
        }
        if params.gnss_derived_turbidity_samples() > TURBIDITY_SAMPLES_MAX {
            diagnostics.push(Diagnostic::TurbidityCeiling);
        }
    }

    if diagnostics.is_empty() {
        Verdict::Valid
    } else {
        Verdict::Invalid(diagnostics)
    }
}
