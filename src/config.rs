use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Tool configuration.
///
/// Loaded from a TOML file and validated before use. Every section and
/// field may be omitted, in which case the default is used.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Input parameters.
    pub input: InputConfig,

    /// Output parameters.
    pub output: OutputConfig,

    /// Random generation parameters.
    pub generate: GenerateConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Maximum sequence length accepted at the prompt or for generation.
    pub max_len: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { max_len: 1_000_000 }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Separator between the elements of a printed sequence.
    pub delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: " ".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Lower bound of the uniform distribution (inclusive).
    pub low: f64,
    /// Upper bound of the uniform distribution (exclusive).
    pub high: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 100.0,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be a TOML document.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.input.max_len, 1..=100_000_000).context("invalid maximum length")?;

        let delimiter = &self.output.delimiter;
        if delimiter.is_empty() {
            bail!("invalid delimiter: must not be empty");
        }
        if delimiter.contains(['\n', '\r']) {
            bail!("invalid delimiter: must not contain line breaks");
        }

        const MAX_ABS: f64 = 1e12;
        check_num(self.generate.low, -MAX_ABS..=MAX_ABS).context("invalid lower bound")?;
        check_num(self.generate.high, -MAX_ABS..=MAX_ABS).context("invalid upper bound")?;
        if self.generate.low >= self.generate.high {
            bail!(
                "lower bound must be below upper bound, but {} >= {}",
                self.generate.low,
                self.generate.high
            );
        }

        Ok(())
    }
}

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

