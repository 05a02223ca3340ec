//! Mean and standard deviation helpers shared by Bollinger Bands and the
//! backtest statistics.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation (divides by N). Zero for an empty slice.
pub fn population_stddev(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) => {
            let variance =
                values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
            variance.sqrt()
        }
        None => 0.0,
    }
}

/// Sample standard deviation (divides by N-1). Zero with fewer than two values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
