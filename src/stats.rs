use std::fmt;

/// Smallest and largest value of a sequence.
///
/// An empty sequence yields [`Extrema::EMPTY`], whose bounds are the
/// sentinels `+inf` and `-inf`. Check [`Extrema::is_empty`] before using them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Check whether `val` equals one of the bounds exactly.
    pub fn is_bound(&self, val: f64) -> bool {
        val == self.min || val == self.max
    }
}

impl fmt::Display for Extrema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Min: none, Max: none")
        } else {
            write!(f, "Min: {}, Max: {}", self.min, self.max)
        }
    }
}

/// Joined result of both tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub extrema: Extrema,
    pub mean: f64,
}

impl Stats {
    pub fn is_empty(&self) -> bool {
        self.extrema.is_empty() || self.mean.is_nan()
    }

    pub fn min(&self) -> Option<f64> {
        (!self.extrema.is_empty()).then_some(self.extrema.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.extrema.is_empty()).then_some(self.extrema.max)
    }
}

/// Scan the sequence once, tracking the running minimum and maximum.
pub fn find_extrema(vals: &[f64]) -> Extrema {
    vals.iter().fold(Extrema::EMPTY, |acc, &val| Extrema {
        min: acc.min.min(val),
        max: acc.max.max(val),
    })
}

/// Arithmetic mean of the sequence, `NaN` if it is empty.
///
/// Falls back to summing pre-scaled values when the plain sum of finite
/// values overflows.
pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    let n_vals = vals.len() as f64;
    let sum = vals.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / n_vals;
    }
    vals.iter().map(|val| val / n_vals).sum()
}

pub fn format_mean(mean: f64) -> String {
    format!("Average: {mean}")
}
