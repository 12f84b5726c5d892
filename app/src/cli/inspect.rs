use super::params::layout;
use anyhow::{anyhow, Context};
use common::{
    record::{ConfigRecord, LayoutFields},
    LayoutVariant,
};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Encoded configuration record
    pub input: PathBuf,
    /// Layout to decode with, detected from the file size by default
    #[arg(long, value_parser(layout))]
    layout: Option<LayoutVariant>,
}

impl Args {
    pub async fn run(self) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(&self.input)
            .await
            .with_context(|| format!("Cannot read {}", self.input.display()))?;
        let layout = match self.layout {
            Some(layout) => layout,
            None => LayoutVariant::from_size(bytes.len())
                .ok_or_else(|| anyhow!("No layout is {} bytes long", bytes.len()))?,
        };
        let record = ConfigRecord::decode(&bytes, layout)?;

        println!("Layout: {}", layout);
        println!("Tracking number: {}", record.tracking_number);
        println!("GNSS samples per window: {}", record.gnss_samples_per_window);
        println!("GNSS sampling rate: {} Hz", record.gnss_sampling_rate);
        println!("GNSS max acquisition: {} min", record.gnss_max_acquisition_wait_time);
        println!("Duty cycle: {} min", record.duty_cycle);
        println!("Iridium max transmit: {} min", record.iridium_max_transmit_time);
        match record.layout_fields {
            LayoutFields::A {
                ct_samples,
                temp_samples,
                version,
            } => {
                println!("CT samples: {}", ct_samples);
                println!("Temperature samples: {}", temp_samples);
                println!("Firmware version: {}", version);
            }
            LayoutFields::B { light_gain_index } => {
                println!("Light gain index: {}", light_gain_index);
            }
        }
        println!("Light samples: {}", record.light_samples);
        println!("Turbidity samples: {}", record.turbidity_samples);

        let flags = record.flags;
        println!("Iridium V3F: {}", flags.iridium_v3f);
        println!("GNSS high performance: {}", flags.gnss_high_performance_mode);
        println!("CT enabled: {}", flags.ct_enabled);
        println!("Temperature enabled: {}", flags.temperature_enabled);
        println!("Light enabled: {}", flags.light_enabled);
        println!("Turbidity enabled: {}", flags.turbidity_enabled);
        println!("Compiled: {} {}", record.compile_date, record.compile_time);
        Ok(())
    }
}
