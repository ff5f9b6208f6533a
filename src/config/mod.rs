use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::ValueEnum;

use crate::cli::CmdArgs;
use crate::constants;

/// How submitted points are labelled, collapsing what used to be two nearly
/// identical reporter variants into one configuration knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelScheme {
    /// `generic_node` resource with node_id/namespace/location labels.
    GenericNode,
    /// `global` resource; device and sensor ride along as metric labels.
    Global,
}

/// Who and where this process is measuring. Built once at startup and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Identity {
    pub device: String,
    pub sensor: String,
    pub location: String,
}

#[derive(Debug)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub addr: u8,
    pub rotated: bool,
    pub hz: Option<u32>,
    pub font: PathBuf,
    pub font_px: f32,
}

#[derive(Debug)]
pub struct CloudConfig {
    pub project: String,
    pub metric: String,
    pub scheme: LabelScheme,
    pub endpoint: String,
    pub token: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub bus: String,
    pub sensor_addr: u8,
    pub csv: PathBuf,
    pub period: Duration,
    pub identity: Identity,
    pub screen: Option<ScreenConfig>,
    pub cloud: Option<CloudConfig>,
}

impl Config {
    pub fn from_args(args: CmdArgs) -> anyhow::Result<Self> {
        let cloud = if args.no_cloud {
            None
        } else {
            let Some(project) = args.project else {
                bail!("--project is mandatory unless --no-cloud is given");
            };
            Some(CloudConfig {
                project,
                metric: args.metric,
                scheme: args.label_scheme,
                endpoint: args.endpoint,
                token: std::env::var(constants::TOKEN_ENV).ok(),
            })
        };

        let screen = args.update_screen.then(|| ScreenConfig {
            width: args.screen_width,
            height: args.screen_height,
            addr: args.screen_addr,
            rotated: args.rotated,
            hz: args.hz,
            font: args.font,
            font_px: args.font_px,
        });

        Ok(Config {
            bus: args.i2c,
            sensor_addr: args.sensor_addr,
            csv: args.csv,
            period: args.period,
            identity: Identity {
                device: args.device.unwrap_or_else(hostname),
                sensor: args.sensor,
                location: args.location,
            },
            screen,
            cloud,
        })
    }
}

fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|name| name.trim().to_string())
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "test".to_string())
}
