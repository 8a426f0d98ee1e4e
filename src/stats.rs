//! Online (single-pass) statistics using Welford's algorithm.

/// Running mean and variance with O(1) memory.
///
/// ```
/// use ct_memcmp::RunningStats;
///
/// let mut stats = RunningStats::new();
/// for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
///     stats.push(x);
/// }
/// assert!((stats.mean() - 3.0).abs() < 1e-12);
/// assert!((stats.variance().unwrap() - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    /// Sum of squared deviations from the current mean.
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.count += 1;
        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean);
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }

    /// Combines two accumulators as if every sample had been pushed into one
    /// (Chan et al. pairwise update).
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;
        self.mean += delta * weight;
        self.m2 += other.m2 + delta * delta * self.count as f64 * weight;
        self.count = count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the samples seen so far; `0.0` when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (n - 1 denominator). `None` until two samples are in.
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some(self.m2 / (self.count - 1) as f64)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

/// Welch's t statistic for a difference in means.
///
/// `None` when either side has fewer than two samples or both variances are zero.
pub fn welch_t(a: &RunningStats, b: &RunningStats) -> Option<f64> {
    let va = a.variance()? / a.count as f64;
    let vb = b.variance()? / b.count as f64;
    let se = (va + vb).sqrt();
    if se == 0.0 {
        return None;
    }
    Some((a.mean - b.mean) / se)
}

/// Pooled standard deviation of two sample groups.
pub fn pooled_std_dev(a: &RunningStats, b: &RunningStats) -> Option<f64> {
    if a.count < 2 || b.count < 2 {
        return None;
    }
    let dof = (a.count + b.count - 2) as f64;
    Some(((a.m2 + b.m2) / dof).sqrt())
}
