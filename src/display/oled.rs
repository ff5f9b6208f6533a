use anyhow::{anyhow, Context};
use linux_embedded_hal::I2cdev;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use tracing::{info, warn};

use crate::config::ScreenConfig;
use crate::display::DisplayDevice;
use crate::render::frame::Frame;

type Panel<SIZE> = Ssd1306<I2CInterface<I2cdev>, SIZE, BufferedGraphicsMode<SIZE>>;

/// SSD1306 panel behind a Linux i2c-dev node. The driver fixes panel
/// geometry at the type level, hence one variant per supported size.
pub enum Oled {
    Size128x32(Panel<DisplaySize128x32>),
    Size128x64(Panel<DisplaySize128x64>),
}

macro_rules! on_panel {
    ($self:expr, |$screen:ident| $body:expr) => {
        match $self {
            Oled::Size128x32($screen) => $body,
            Oled::Size128x64($screen) => $body,
        }
    };
}

impl Oled {
    pub fn connect(bus: &str, config: &ScreenConfig) -> anyhow::Result<Self> {
        if let Some(hz) = config.hz {
            // The i2c-dev interface has no per-handle clock control; the bus
            // speed is a kernel/boot parameter.
            warn!(hz, "ignoring bus speed override, unsupported by i2c-dev");
        }

        let i2c = I2cdev::new(bus)
            .with_context(|| format!("opening i2c bus {bus} for the screen"))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, config.addr);
        let rotation = if config.rotated {
            DisplayRotation::Rotate180
        } else {
            DisplayRotation::Rotate0
        };

        let mut oled = match (config.width, config.height) {
            (128, 32) => Oled::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, rotation).into_buffered_graphics_mode(),
            ),
            (128, 64) => Oled::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, rotation).into_buffered_graphics_mode(),
            ),
            (width, height) => anyhow::bail!(
                "unsupported screen size {width}x{height}, supported: 128x32, 128x64"
            ),
        };

        oled.init()?;
        info!(
            width = config.width,
            height = config.height,
            addr = %format_args!("0x{:02x}", config.addr),
            "screen connected"
        );
        Ok(oled)
    }

    fn init(&mut self) -> anyhow::Result<()> {
        on_panel!(self, |screen| screen
            .init()
            .map_err(|err| anyhow!("initializing screen: {err:?}")))
    }

    /// Turns the panel off. Harmless to call more than once.
    pub fn halt(&mut self) {
        on_panel!(self, |screen| {
            let _ = screen.set_display_on(false);
        });
    }
}

impl DisplayDevice for Oled {
    fn draw(&mut self, frame: &Frame) -> anyhow::Result<()> {
        on_panel!(self, |screen| {
            for y in 0..frame.height() {
                for x in 0..frame.width() {
                    screen.set_pixel(x, y, frame.is_on(x, y));
                }
            }
            screen
                .flush()
                .map_err(|err| anyhow!("flushing screen: {err:?}"))
        })
    }
}

impl Drop for Oled {
    fn drop(&mut self) {
        // The bus handle itself closes when the inner I2cdev drops.
        self.halt();
    }
}
