mod cli;
mod config;
mod constants;
mod display;
mod init;
mod poll;
mod render;
mod report;
mod sense;

use clap::Parser;
use linux_embedded_hal::I2cdev;
use tracing::{error, info};

use crate::cli::CmdArgs;
use crate::config::Config;
use crate::display::oled::Oled;
use crate::display::StatusScreen;
use crate::init::init_tracing;
use crate::poll::PollLoop;
use crate::render::face::Face;
use crate::report::cloud::MonitoringClient;
use crate::report::csv::CsvSink;
use crate::sense::mcp9808::Mcp9808;

fn main() {
    if let Err(err) = run() {
        error!("fatal: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = CmdArgs::parse();
    init_tracing()?;
    let config = Config::from_args(args)?;

    info!("temp_monitoring starting up...");

    let bus = I2cdev::new(&config.bus)
        .map_err(|err| anyhow::anyhow!("opening i2c bus {}: {err}", config.bus))?;
    let sensor = Mcp9808::new(bus, config.sensor_addr)?;
    info!(
        bus = %config.bus,
        addr = %format_args!("0x{:02x}", config.sensor_addr),
        "sensor ready"
    );

    // The screen opens its own handle on the same bus node; the kernel
    // serializes transactions between the two.
    let screen = match &config.screen {
        Some(screen_config) => {
            let face = Face::load(&screen_config.font, screen_config.font_px)?;
            let oled = Oled::connect(&config.bus, screen_config)?;
            Some(StatusScreen::new(
                oled,
                face,
                screen_config.width,
                screen_config.height,
            ))
        }
        None => None,
    };

    let cloud = match &config.cloud {
        Some(cloud_config) => Some(MonitoringClient::new(cloud_config, &config.identity)?),
        None => None,
    };

    let csv = CsvSink::open(&config.csv)?;

    let mut poll = PollLoop::new(sensor, csv, cloud, screen);
    poll.run(config.period)
}
