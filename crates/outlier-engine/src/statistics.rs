//! Column Statistics

/// Summary statistics of a column's present values
#[derive(Debug, Clone, Default)]
pub struct ColumnStatistics {
    /// Number of values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Median (0.5 quantile)
    pub median: f64,
    /// First quartile
    pub q1: f64,
    /// Third quartile
    pub q3: f64,
}

impl ColumnStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = mean(values);

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        let sorted = sorted(values);

        Self {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
            median: quantile_sorted(&sorted, 0.5),
            q1: quantile_sorted(&sorted, 0.25),
            q3: quantile_sorted(&sorted, 0.75),
        }
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; 0 for an empty slice
pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between order statistics at `(n-1)·q`
pub fn quantile(values: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(values), q)
}

/// Most frequent value; ties resolve to the smallest, 0 for an empty slice
pub fn mode(values: &[f64]) -> f64 {
    let sorted = sorted(values);
    let mut best = match sorted.first() {
        Some(&v) => (v, 0usize),
        None => return 0.0,
    };

    let mut run_value = sorted[0];
    let mut run_len = 0usize;
    for &v in &sorted {
        if v == run_value {
            run_len += 1;
        } else {
            run_value = v;
            run_len = 1;
        }
        if run_len > best.1 {
            best = (run_value, run_len);
        }
    }
    best.0
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = (n - 1) as f64 * q.clamp(0.0, 1.0);
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}
