use crate::stats::{Extrema, Stats, format_mean};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Outcome of one pass, as saved to disk.
///
/// `min` and `max` are `None` and `average` is `NaN` for an empty input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub input: Vec<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: f64,
    pub output: Vec<f64>,
    pub n_replaced: usize,
}

impl Report {
    pub fn new(input: Vec<f64>, stats: &Stats, output: Vec<f64>, n_replaced: usize) -> Self {
        Self {
            input,
            min: stats.min(),
            max: stats.max(),
            average: stats.mean,
            output,
            n_replaced,
        }
    }

    pub fn stats(&self) -> Stats {
        let extrema = match (self.min, self.max) {
            (Some(min), Some(max)) => Extrema { min, max },
            _ => Extrema::EMPTY,
        };
        Stats {
            extrema,
            mean: self.average,
        }
    }

    pub fn extrema_line(&self) -> String {
        self.stats().extrema.to_string()
    }

    pub fn mean_line(&self) -> String {
        format_mean(self.average)
    }

    /// Save the report to a MessagePack-encoded file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, &self).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    /// Load a previously saved report.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let report = decode::from_read(&mut reader).context("failed to deserialize report")?;
        Ok(report)
    }
}

