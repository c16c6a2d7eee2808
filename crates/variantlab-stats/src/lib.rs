//! Descriptive statistics and two-sample hypothesis testing for experiment data.
//!
//! Everything here works on plain `&[f64]` slices that the caller has already
//! stripped of missing values. The [`welch_t_test`] entry point returns a
//! [`WelchTest`] with the statistic, degrees of freedom and two-sided p-value,
//! or a [`TestError`] naming the precondition the samples violated.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Which side of a two-sample comparison a precondition failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    A,
    B,
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sample::A => write!(f, "sample A"),
            Sample::B => write!(f, "sample B"),
        }
    }
}

/// Why a t-test could not produce a defined statistic.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestError {
    #[error("{sample} is empty")]
    EmptySample { sample: Sample },

    #[error("{sample} has {got} value(s), need at least 2")]
    InsufficientSamples { sample: Sample, got: usize },

    #[error("{sample} has zero variance")]
    ZeroVariance { sample: Sample },

    #[error("samples contain non-finite values or produce a non-finite statistic")]
    NonFinite,
}

/// Result of a Welch unequal-variance two-sample t-test (two-sided).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelchTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
}

impl WelchTest {
    /// Whether the difference in means is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Quartiles of a sample plus the derived Tukey fences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// `[q1 - k·IQR, q3 + k·IQR]`.
    pub fn fences(&self, k: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - k * iqr, self.q3 + k * iqr)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Descriptive statistics
// ═══════════════════════════════════════════════════════════════════════════════

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with Bessel's correction (ddof = 1). NaN below two values.
pub fn sample_variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64
}

/// Median (average of the two middle values for even lengths). NaN when empty.
pub fn median(data: &[f64]) -> f64 {
    quantile(data, 0.5)
}

/// `p`-th quantile using linear interpolation between order statistics
/// (the R-7 / numpy "linear" method).
///
/// Returns NaN if `data` is empty, `p` is outside `[0, 1]`, or any value is NaN.
pub fn quantile(data: &[f64], p: f64) -> f64 {
    if data.is_empty() || !(0.0..=1.0).contains(&p) || data.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, p)
}

/// Same as [`quantile`] on data already sorted ascending.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();
    if j + 1 >= n {
        sorted[n - 1]
    } else {
        sorted[j] + g * (sorted[j + 1] - sorted[j])
    }
}

/// Q1, median and Q3 in one sort. `None` for empty or NaN-containing data.
pub fn quartiles(data: &[f64]) -> Option<Quartiles> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(Quartiles {
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Hypothesis tests
// ═══════════════════════════════════════════════════════════════════════════════

/// Check the shared preconditions for one side of a two-sample test and
/// return `(n, mean, variance)`.
fn describe_sample(data: &[f64], sample: Sample) -> Result<(f64, f64, f64), TestError> {
    match data.len() {
        0 => return Err(TestError::EmptySample { sample }),
        1 => return Err(TestError::InsufficientSamples { sample, got: 1 }),
        _ => {}
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(TestError::NonFinite);
    }
    let var = sample_variance(data);
    if var <= 0.0 {
        return Err(TestError::ZeroVariance { sample });
    }
    Ok((data.len() as f64, mean(data), var))
}

/// Welch's two-sample t-test, two-sided.
///
/// t = (x̄_A − x̄_B) / sqrt(s²_A/n_A + s²_B/n_B), with degrees of freedom from
/// the Welch–Satterthwaite approximation and the p-value from the Student-t
/// survival function at that df. Swapping the samples flips the sign of t and
/// leaves the p-value unchanged.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<WelchTest, TestError> {
    let (n_a, mean_a, var_a) = describe_sample(a, Sample::A)?;
    let (n_b, mean_b, var_b) = describe_sample(b, Sample::B)?;

    let se_a = var_a / n_a;
    let se_b = var_b / n_b;
    let se2 = se_a + se_b;
    let statistic = (mean_a - mean_b) / se2.sqrt();
    let df = se2 * se2 / (se_a * se_a / (n_a - 1.0) + se_b * se_b / (n_b - 1.0));

    if !statistic.is_finite() || !df.is_finite() {
        return Err(TestError::NonFinite);
    }

    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| TestError::NonFinite)?;
    let p_value = (2.0 * dist.sf(statistic.abs())).min(1.0);

    Ok(WelchTest {
        statistic,
        p_value,
        df,
        n_a: a.len(),
        n_b: b.len(),
        mean_a,
        mean_b,
    })
}
