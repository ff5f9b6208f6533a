use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::LabelScheme;
use crate::constants;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Polls an I2C temperature sensor and reports readings to a CSV file, \
             an OLED screen and cloud monitoring"
)]
pub struct CmdArgs {
    /// I2C bus device node to use.
    #[arg(long = "i2c", default_value = constants::DEFAULT_BUS)]
    pub i2c: String,

    /// Output file to append readings to.
    #[arg(long)]
    pub csv: PathBuf,

    /// Device this runs on. Defaults to the hostname.
    #[arg(long)]
    pub device: Option<String>,

    /// Sensor name, i.e. what/where this is measuring.
    #[arg(long, default_value = "test")]
    pub sensor: String,

    /// I2C address of the temperature sensor.
    #[arg(long, default_value = "0x18", value_parser = parse_i2c_addr)]
    pub sensor_addr: u8,

    /// Cloud project id that will own the data.
    #[arg(long)]
    pub project: Option<String>,

    /// Update an attached OLED screen.
    #[arg(long)]
    pub update_screen: bool,

    /// Screen width in pixels.
    #[arg(long, default_value_t = 128)]
    pub screen_width: u32,

    /// Screen height in pixels.
    #[arg(long, default_value_t = 32)]
    pub screen_height: u32,

    /// I2C address of the screen.
    #[arg(long, default_value = "0x3c", value_parser = parse_i2c_addr)]
    pub screen_addr: u8,

    /// Mount the screen upside down.
    #[arg(long)]
    pub rotated: bool,

    /// I2C bus speed override, in hertz.
    #[arg(long)]
    pub hz: Option<u32>,

    /// TTF/OTF font for the screen text.
    #[arg(long, default_value = constants::DEFAULT_FONT)]
    pub font: PathBuf,

    /// Font size on the screen, in pixels.
    #[arg(long, default_value_t = 13.0)]
    pub font_px: f32,

    /// Location label to store the time series under.
    #[arg(long, default_value = "us-east1-a")]
    pub location: String,

    /// How often to poll the sensor.
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    pub period: Duration,

    /// Disable cloud reporting.
    #[arg(long)]
    pub no_cloud: bool,

    /// Metric name to report under.
    #[arg(long, default_value = constants::DEFAULT_METRIC)]
    pub metric: String,

    /// Label scheme for submitted points.
    #[arg(long, value_enum, default_value_t = LabelScheme::GenericNode)]
    pub label_scheme: LabelScheme,

    /// Monitoring API endpoint.
    #[arg(long, default_value = constants::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

fn parse_i2c_addr(raw: &str) -> Result<u8, std::num::ParseIntError> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i2c_addr_accepts_hex_and_decimal() {
        assert_eq!(parse_i2c_addr("0x18"), Ok(0x18));
        assert_eq!(parse_i2c_addr("0X3C"), Ok(0x3c));
        assert_eq!(parse_i2c_addr("24"), Ok(24));
        assert!(parse_i2c_addr("zz").is_err());
    }

    #[test]
    fn test_defaults_match_the_documented_surface() {
        let args = CmdArgs::parse_from(["temp_monitoring", "--csv", "out.csv"]);
        assert_eq!(args.i2c, constants::DEFAULT_BUS);
        assert_eq!(args.period, Duration::from_secs(60));
        assert_eq!((args.screen_width, args.screen_height), (128, 32));
        assert_eq!(args.metric, constants::DEFAULT_METRIC);
        assert!(!args.no_cloud);
        assert!(!args.update_screen);
    }

    #[test]
    fn test_period_accepts_humantime_values() {
        let args = CmdArgs::parse_from(["temp_monitoring", "--csv", "out.csv", "--period", "1s"]);
        assert_eq!(args.period, Duration::from_secs(1));
    }
}
