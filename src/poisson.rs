//! The univariate Poisson distribution.

use statrs::function::factorial::ln_factorial;
use tinyrand::Rand;

/// Probability of exactly `k` events when `lambda` are expected.
#[inline]
pub fn univariate(k: u8, lambda: f64) -> f64 {
    if lambda == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    f64::exp(k as f64 * lambda.ln() - lambda - ln_factorial(k as u64))
}

/// Probabilities of 0 through `max` events, computed by recurrence.
pub fn univariate_series(lambda: f64, max: u8) -> Vec<f64> {
    let mut series = Vec::with_capacity(max as usize + 1);
    let mut prob = f64::exp(-lambda);
    series.push(prob);
    for k in 1..=max {
        prob *= lambda / k as f64;
        series.push(prob);
    }
    series
}

/// Draws a single Poisson variate by Knuth's multiplication method. Suited to the small rates
/// encountered in football; the expected number of uniform draws is `lambda + 1`.
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u32 {
    let threshold = f64::exp(-lambda);
    let mut k = 0;
    let mut product = random_f64(rand);
    while product > threshold {
        k += 1;
        product *= random_f64(rand);
    }
    k
}

#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}
