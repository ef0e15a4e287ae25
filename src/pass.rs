use crate::stats::{Stats, compute_mean, find_extrema, format_mean};
use anyhow::{Context, Result, anyhow, bail};
use std::{fmt, io::Write, sync::Mutex, thread};

/// Lifecycle of a [`Pass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Joined,
    Replacing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Joined => "joined",
            Phase::Replacing => "replacing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Fork-join statistics pass over one sequence.
///
/// Two scoped threads share the sequence read-only: one finds the extrema,
/// the other the mean. Each returns its own result through its join handle,
/// so there is no shared mutable state during the parallel phase. After the
/// join, every element equal to an extremum is replaced by the mean.
pub struct Pass {
    vals: Vec<f64>,
    phase: Phase,
}

impl Pass {
    pub fn new(vals: Vec<f64>) -> Self {
        Self {
            vals,
            phase: Phase::Idle,
        }
    }

    pub fn vals(&self) -> &[f64] {
        &self.vals
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn into_vals(self) -> Vec<f64> {
        self.vals
    }

    /// Run both tasks concurrently and block until both have finished.
    ///
    /// Each task writes its own line to `out` before returning.
    pub fn compute_stats<W: Write + Send>(&mut self, out: &Mutex<W>) -> Result<Stats> {
        if self.phase != Phase::Idle {
            bail!("cannot compute stats in phase {}", self.phase);
        }
        self.set_phase(Phase::Running);

        let vals = &self.vals;
        let (extrema, mean) = thread::scope(|scope| {
            let extrema_task = scope.spawn(|| {
                let extrema = find_extrema(vals);
                emit(out, &extrema.to_string())?;
                Ok::<_, anyhow::Error>(extrema)
            });
            let mean_task = scope.spawn(|| {
                let mean = compute_mean(vals);
                emit(out, &format_mean(mean))?;
                Ok::<_, anyhow::Error>(mean)
            });

            // Join both before inspecting either result.
            let extrema = extrema_task.join();
            let mean = mean_task.join();

            let extrema = extrema
                .map_err(|_| anyhow!("extrema task panicked"))?
                .context("extrema task failed")?;
            let mean = mean
                .map_err(|_| anyhow!("mean task panicked"))?
                .context("mean task failed")?;
            Ok::<_, anyhow::Error>((extrema, mean))
        })?;

        self.set_phase(Phase::Joined);

        let stats = Stats { extrema, mean };
        if stats.is_empty() {
            log::warn!("sequence is empty, stats hold no data");
        }
        Ok(stats)
    }

    /// Replace every element equal to the minimum or maximum by the mean.
    ///
    /// Returns the number of replaced elements. Nothing is replaced when the
    /// mean is not finite.
    pub fn replace_extrema(&mut self, stats: &Stats) -> Result<usize> {
        if self.phase != Phase::Joined {
            bail!("cannot replace extrema in phase {}", self.phase);
        }
        self.set_phase(Phase::Replacing);

        let extrema = stats.extrema;
        let mean = stats.mean;

        let mut n_replaced = 0;
        if !mean.is_finite() {
            log::warn!("mean is {mean}, skipping replacement");
        } else {
            for val in self.vals.iter_mut().filter(|val| extrema.is_bound(**val)) {
                *val = mean;
                n_replaced += 1;
            }
        }

        self.set_phase(Phase::Done);
        log::info!("replaced {n_replaced} of {} elements", self.vals.len());

        Ok(n_replaced)
    }

    /// Perform the whole pass: compute, join, replace.
    pub fn perform<W: Write + Send>(&mut self, out: &Mutex<W>) -> Result<(Stats, usize)> {
        let stats = self
            .compute_stats(out)
            .context("failed to compute stats")?;
        let n_replaced = self
            .replace_extrema(&stats)
            .context("failed to replace extrema")?;
        Ok((stats, n_replaced))
    }

    fn set_phase(&mut self, phase: Phase) {
        log::debug!("pass phase {} -> {phase}", self.phase);
        self.phase = phase;
    }
}

/// Join the values with `delimiter`.
pub fn format_seq(vals: &[f64], delimiter: &str) -> String {
    vals.iter()
        .map(|val| val.to_string())
        .collect::<Vec<_>>()
        .join(delimiter)
}

// One lock covers both the line and its flush.
fn emit<W: Write>(out: &Mutex<W>, line: &str) -> Result<()> {
    let mut out = out.lock().map_err(|_| anyhow!("output lock poisoned"))?;
    writeln!(out, "{line}").context("failed to write line")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha12Rng;
    use rand_distr::Uniform;

    fn run(vals: &[f64]) -> (Stats, Vec<f64>) {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(vals.to_vec());
        let (stats, _) = pass.perform(&out).expect("pass failed");
        assert_eq!(pass.phase(), Phase::Done);
        (stats, pass.into_vals())
    }

    #[test]
    fn sample_sequence() {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(vec![10.0, 5.0, 20.0, 3.0, 8.0]);
        let (stats, n_replaced) = pass.perform(&out).unwrap();

        assert_eq!(stats.min(), Some(3.0));
        assert_eq!(stats.max(), Some(20.0));
        assert!((stats.mean - 9.2).abs() < 1e-2);
        assert_eq!(n_replaced, 2);

        let expected = [10.0, 5.0, 9.2, 9.2, 8.0];
        for (val, exp) in pass.vals().iter().zip(expected) {
            assert!((val - exp).abs() < 1e-2, "{val} != {exp}");
        }
        assert_eq!(format_seq(pass.vals(), " "), "10 5 9.2 9.2 8");

        let out = String::from_utf8(out.into_inner().unwrap()).unwrap();
        let mut lines: Vec<_> = out.lines().collect();
        lines.sort();
        assert_eq!(lines, ["Average: 9.2", "Min: 3, Max: 20"]);
    }

    #[test]
    fn empty_sequence() {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(Vec::new());
        let (stats, n_replaced) = pass.perform(&out).unwrap();

        assert!(stats.is_empty());
        assert!(stats.extrema.is_empty());
        assert!(stats.mean.is_nan());
        assert_eq!(n_replaced, 0);
        assert!(pass.vals().is_empty());

        let out = String::from_utf8(out.into_inner().unwrap()).unwrap();
        assert!(out.contains("Min: none, Max: none"));
        assert!(out.contains("Average: NaN"));
    }

    #[test]
    fn single_element() {
        let (stats, vals) = run(&[7.0]);
        assert_eq!(stats.min(), Some(7.0));
        assert_eq!(stats.max(), Some(7.0));
        assert_eq!(stats.mean, 7.0);
        assert_eq!(vals, [7.0]);
    }

    #[test]
    fn duplicated_extrema_are_all_replaced() {
        let (stats, vals) = run(&[1.0, 4.0, 1.0, 2.0, 4.0]);
        assert_eq!(stats.mean, 2.4);
        assert_eq!(vals, [2.4, 2.4, 2.4, 2.0, 2.4]);
    }

    #[test]
    fn thresholds_stay_fixed_during_replacement() {
        // Bounds are taken before the loop, never from already replaced values.
        let (_, vals) = run(&[0.0, 5.0, 10.0]);
        assert_eq!(vals, [5.0, 5.0, 5.0]);

        let (_, vals) = run(&[0.0, 1.0, 2.0, 9.0]);
        assert_eq!(vals, [3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn phases_are_enforced() {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(vec![1.0, 2.0]);
        assert_eq!(pass.phase(), Phase::Idle);

        let stats = Stats {
            extrema: find_extrema(&[1.0, 2.0]),
            mean: 1.5,
        };
        assert!(pass.replace_extrema(&stats).is_err());

        let stats = pass.compute_stats(&out).unwrap();
        assert_eq!(pass.phase(), Phase::Joined);
        assert!(pass.compute_stats(&out).is_err());

        pass.replace_extrema(&stats).unwrap();
        assert_eq!(pass.phase(), Phase::Done);
        assert!(pass.replace_extrema(&stats).is_err());
    }

    #[test]
    fn huge_values_keep_a_finite_mean() {
        let (stats, vals) = run(&[1e308, 1e308, -1e308, -1e308]);
        assert!(stats.mean.is_finite());
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.min(), Some(-1e308));
        assert_eq!(stats.max(), Some(1e308));
        assert_eq!(vals, [0.0; 4]);
    }

    #[test]
    fn infinite_mean_is_not_propagated() {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(vec![1.0, 2.0]);
        pass.compute_stats(&out).unwrap();

        let stats = Stats {
            extrema: find_extrema(&[1.0, 2.0]),
            mean: f64::INFINITY,
        };
        assert_eq!(pass.replace_extrema(&stats).unwrap(), 0);
        assert_eq!(pass.vals(), [1.0, 2.0]);
    }

    #[test]
    fn nan_mean_is_not_propagated() {
        let out = Mutex::new(Vec::new());
        let mut pass = Pass::new(vec![1.0, 2.0]);
        pass.compute_stats(&out).unwrap();

        let stats = Stats {
            extrema: find_extrema(&[1.0, 2.0]),
            mean: f64::NAN,
        };
        assert_eq!(pass.replace_extrema(&stats).unwrap(), 0);
        assert_eq!(pass.vals(), [1.0, 2.0]);
    }

    #[test]
    fn concurrent_result_matches_sequential() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let len_dist = Uniform::new(1, 64).unwrap();
        let val_dist = Uniform::new(-1000.0, 1000.0).unwrap();

        for _ in 0..200 {
            let len = len_dist.sample(&mut rng);
            let vals: Vec<f64> = (0..len).map(|_| val_dist.sample(&mut rng)).collect();

            let out = Mutex::new(Vec::new());
            let mut pass = Pass::new(vals.clone());
            let (stats, _) = pass.perform(&out).unwrap();

            let extrema = find_extrema(&vals);
            let mean = compute_mean(&vals);
            assert_eq!(stats.extrema, extrema);
            assert_eq!(stats.mean, mean);

            for (old, new) in vals.iter().zip(pass.vals()) {
                if extrema.is_bound(*old) {
                    assert_eq!(*new, mean);
                } else {
                    assert_eq!(new, old);
                }
            }

            let out = String::from_utf8(out.into_inner().unwrap()).unwrap();
            assert_eq!(out.lines().count(), 2);
        }
    }

    #[test]
    fn custom_delimiter() {
        assert_eq!(format_seq(&[1.0, -2.5], ", "), "1, -2.5");
        assert_eq!(format_seq(&[], ","), "");
    }
}
