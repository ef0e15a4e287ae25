use crate::config::{Config, check_num};
use crate::input::{check_finite, prompt_seq};
use crate::pass::{Pass, format_seq};
use crate::report::Report;
use crate::sample::generate_seq;
use anyhow::{Context, Result};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Runs passes on sequences from the different input sources.
pub struct Session {
    cfg: Config,
    report_file: Option<PathBuf>,
}

impl Session {
    pub fn new(config_file: Option<&Path>, report_file: Option<PathBuf>) -> Result<Self> {
        let cfg = match config_file {
            Some(config_file) => Config::from_file(config_file)
                .with_context(|| format!("failed to load {config_file:?}"))?,
            None => Config::default(),
        };
        log::info!("{cfg:#?}");

        Ok(Self { cfg, report_file })
    }

    /// Read the sequence interactively from stdin.
    pub fn run_prompt(&self) -> Result<()> {
        let vals = {
            let stdin = io::stdin().lock();
            let mut stdout = io::stdout().lock();
            prompt_seq(stdin, &mut stdout, self.cfg.input.max_len)
                .context("failed to read sequence")?
        };
        self.run_pass(vals)
    }

    pub fn run_vals(&self, vals: Vec<f64>) -> Result<()> {
        for (i_val, &val) in vals.iter().enumerate() {
            check_finite(val).with_context(|| format!("invalid element {i_val}"))?;
        }
        self.run_pass(vals)
    }

    pub fn run_generated(&self, len: usize, seed: Option<u64>) -> Result<()> {
        check_num(len, 0..=self.cfg.input.max_len).context("invalid length")?;

        let vals =
            generate_seq(&self.cfg.generate, len, seed).context("failed to generate sequence")?;
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "Generated array: {}",
            format_seq(&vals, &self.cfg.output.delimiter)
        )
        .context("failed to write generated sequence")?;
        drop(stdout);

        self.run_pass(vals)
    }

    /// Print a previously saved report.
    pub fn inspect_report<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let report = Report::load(file).with_context(|| format!("failed to load {file:?}"))?;
        log::info!("loaded {file:?}");

        let delimiter = &self.cfg.output.delimiter;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "Input array: {}", format_seq(&report.input, delimiter))?;
        writeln!(stdout, "{}", report.extrema_line())?;
        writeln!(stdout, "{}", report.mean_line())?;
        writeln!(stdout, "Replaced elements: {}", report.n_replaced)?;
        writeln!(stdout, "Modified array: {}", format_seq(&report.output, delimiter))?;

        Ok(())
    }

    fn run_pass(&self, vals: Vec<f64>) -> Result<()> {
        log::info!("starting pass over {} elements", vals.len());

        let input = self.report_file.as_ref().map(|_| vals.clone());

        let out = Mutex::new(io::stdout());
        let mut pass = Pass::new(vals);
        let (stats, n_replaced) = pass.perform(&out).context("failed to perform pass")?;
        log::debug!("pass ended in phase {}", pass.phase());

        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "Modified array: {}",
            format_seq(pass.vals(), &self.cfg.output.delimiter)
        )
        .context("failed to write modified sequence")?;
        drop(stdout);

        if let (Some(report_file), Some(input)) = (&self.report_file, input) {
            let report = Report::new(input, &stats, pass.into_vals(), n_replaced);
            report
                .save(report_file)
                .with_context(|| format!("failed to save {report_file:?}"))?;
            log::info!("saved {report_file:?}");
        }

        Ok(())
    }
}
