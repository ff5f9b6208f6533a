use anyhow::Context;
use embedded_hal::i2c::I2c;

use crate::sense::Thermometer;

const REG_AMBIENT_TEMP: u8 = 0x05;
const REG_MANUFACTURER_ID: u8 = 0x06;
const REG_DEVICE_ID: u8 = 0x07;

const MANUFACTURER_ID: u16 = 0x0054;
const DEVICE_ID: u8 = 0x04;

/// MCP9808 temperature sensor on an I2C bus.
pub struct Mcp9808<I> {
    bus: I,
    addr: u8,
}

impl<I> Mcp9808<I>
where
    I: I2c,
    I::Error: std::error::Error + Send + Sync + 'static,
{
    /// Probes the chip's manufacturer and device ID registers before
    /// returning, so a wrong address or a missing sensor fails at startup
    /// rather than on the first tick.
    pub fn new(bus: I, addr: u8) -> anyhow::Result<Self> {
        let mut dev = Mcp9808 { bus, addr };
        let manufacturer = dev
            .read_u16(REG_MANUFACTURER_ID)
            .context("reading manufacturer id")?;
        let device = dev.read_u16(REG_DEVICE_ID).context("reading device id")?;
        if manufacturer != MANUFACTURER_ID || (device >> 8) as u8 != DEVICE_ID {
            anyhow::bail!(
                "no mcp9808 at 0x{:02x}: manufacturer 0x{:04x}, device 0x{:04x}",
                addr,
                manufacturer,
                device
            );
        }
        Ok(dev)
    }

    fn read_u16(&mut self, reg: u8) -> Result<u16, I::Error> {
        let mut buf = [0u8; 2];
        self.bus.write_read(self.addr, &[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<I> Thermometer for Mcp9808<I>
where
    I: I2c,
    I::Error: std::error::Error + Send + Sync + 'static,
{
    fn sense_celsius(&mut self) -> anyhow::Result<f64> {
        let raw = self
            .read_u16(REG_AMBIENT_TEMP)
            .context("reading ambient temperature")?;
        Ok(decode_ambient(raw))
    }
}

/// Ambient register layout: alert flags in bits 15..13, sign in bit 12,
/// magnitude in bits 11..0 at 1/16 degC per LSB.
fn decode_ambient(raw: u16) -> f64 {
    let mut celsius = f64::from(raw & 0x0fff) / 16.0;
    if raw & 0x1000 != 0 {
        celsius -= 256.0;
    }
    celsius
}
