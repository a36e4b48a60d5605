//! Descriptive statistics shared by the scorers
//!
//! Every helper returns `None` instead of producing NaN, so callers decide
//! which sentinel an empty or degenerate input maps to.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`)
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Coefficient of variation, `stdev / mean`
///
/// A zero mean gives `0.0`: with nothing logged there is nothing to vary.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if avg == 0.0 {
        return Some(0.0);
    }
    let std_dev = population_std_dev(values)?;
    Some((std_dev / avg).abs())
}

/// Ordinary least-squares slope of `values` against their index
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let (numerator, denominator) = values.iter().enumerate().fold(
        (0.0, 0.0),
        |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        },
    );
    Some(numerator / denominator)
}

/// Pearson correlation over two equally long series
///
/// `None` when the lengths differ, fewer than two points are given, or
/// either side is flat (zero variance leaves `r` undefined).
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let x_mean = mean(xs)?;
    let y_mean = mean(ys)?;

    let mut covariance = 0.0;
    let mut x_ss = 0.0;
    let mut y_ss = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        covariance += dx * dy;
        x_ss += dx * dx;
        y_ss += dy * dy;
    }

    if is_flat(x_ss, x_mean, xs.len()) || is_flat(y_ss, y_mean, ys.len()) {
        return None;
    }

    let r = covariance / (x_ss.sqrt() * y_ss.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

// Summing a constant series can leave rounding residue in the mean, so a
// flat series is detected relative to its magnitude.
fn is_flat(sum_sq: f64, mean: f64, n: usize) -> bool {
    sum_sq <= 1e-20 * n as f64 * (1.0 + mean * mean)
}

/// Round to an integer percentage clamped to `[0, 100]`
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
