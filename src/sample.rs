use crate::config::GenerateConfig;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;

/// Draw `len` values uniformly from `[cfg.low, cfg.high)`.
///
/// The generator is seeded from `seed` when given, else from OS entropy.
pub fn generate_seq(cfg: &GenerateConfig, len: usize, seed: Option<u64>) -> Result<Vec<f64>> {
    let mut rng = match seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
    };

    let val_dist = Uniform::new(cfg.low, cfg.high).context("failed to build distribution")?;
    let vals = (0..len).map(|_| val_dist.sample(&mut rng)).collect();

    Ok(vals)
}

