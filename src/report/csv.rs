use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::sense::Measurement;

/// Append-only record file, one `<epoch-seconds>,<celsius>` line per
/// reading. Opened once at startup and held for the process lifetime;
/// single writer, no rotation.
pub struct CsvSink {
    file: File,
}

impl CsvSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(CsvSink { file })
    }

    pub fn append(&mut self, measurement: &Measurement) -> anyhow::Result<()> {
        writeln!(
            self.file,
            "{:.6},{}",
            measurement.epoch_secs(),
            measurement.celsius
        )?;
        Ok(())
    }
}
