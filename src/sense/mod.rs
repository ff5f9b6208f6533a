pub mod mcp9808;

use chrono::{DateTime, Utc};

/// One temperature reading. Produced once per tick and handed to every sink
/// unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub at: DateTime<Utc>,
    pub celsius: f64,
}

impl Measurement {
    /// Unix epoch seconds with fractional part, as written to the CSV file.
    pub fn epoch_secs(&self) -> f64 {
        self.at.timestamp() as f64 + f64::from(self.at.timestamp_subsec_nanos()) / 1e9
    }
}

pub trait Thermometer {
    fn sense_celsius(&mut self) -> anyhow::Result<f64>;
}
