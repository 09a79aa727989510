use num_traits::Float;

use core::fmt;

/// Snapshot of the running aggregates a window holds.
///
/// Every statistic in this crate is a pure function of these three numbers,
/// which is what lets a window answer queries in O(1) regardless of its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments<T> {
    /// Number of retained observations
    pub count: usize,
    /// Sum of the retained observations
    pub sum: T,
    /// Sum of the squares of the retained observations
    pub sum_sq: T,
}

impl<T: Float> Moments<T> {
    /// Aggregates of an empty window
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: T::zero(),
            sum_sq: T::zero(),
        }
    }
}

/// Returns the population variance (divides by `n`)
///
/// Computed as `sum_sq / n - mean²`. No clamping is applied, so heavy
/// cancellation can yield a tiny negative value for a near-constant window.
///
/// # Returns
///
/// * `T` - The population variance, or NaN if `count < 1`
pub fn population_variance<T: Float>(m: &Moments<T>) -> T {
    if m.count < 1 {
        return T::nan();
    }
    let Some(n) = T::from(m.count) else {
        return T::nan();
    };
    let mean = m.sum / n;
    m.sum_sq / n - mean * mean
}

/// Returns the sample variance (divides by `n - 1`)
///
/// Bessel's correction `n / (n - 1)` is applied to the population variance.
///
/// # Returns
///
/// * `T` - The sample variance, or NaN if `count < 2`
pub fn sample_variance<T: Float>(m: &Moments<T>) -> T {
    if m.count < 2 {
        return T::nan();
    }
    let Some(n) = T::from(m.count) else {
        return T::nan();
    };
    population_variance(m) * (n / (n - T::one()))
}

/// Returns the population standard deviation, NaN when undefined
pub fn population_stddev<T: Float>(m: &Moments<T>) -> T {
    stddev_of(population_variance(m))
}

/// Returns the sample standard deviation, NaN when undefined
pub fn sample_stddev<T: Float>(m: &Moments<T>) -> T {
    stddev_of(sample_variance(m))
}

// A negative variance still goes through sqrt and comes out as NaN.
#[inline]
fn stddev_of<T: Float>(variance: T) -> T {
    if variance.is_nan() {
        variance
    } else {
        variance.sqrt()
    }
}

/// The four dispersion statistics a window aggregate can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticKind {
    /// Standard deviation with Bessel's correction
    SampleStddev,
    /// Standard deviation of the window taken as the whole population
    PopulationStddev,
    /// Variance with Bessel's correction
    SampleVariance,
    /// Variance of the window taken as the whole population
    PopulationVariance,
}

impl StatisticKind {
    /// Every statistic kind, in registration order
    pub const ALL: [StatisticKind; 4] = [
        StatisticKind::SampleStddev,
        StatisticKind::PopulationStddev,
        StatisticKind::SampleVariance,
        StatisticKind::PopulationVariance,
    ];

    /// Returns `true` for the Bessel-corrected (sample) statistics
    #[inline]
    pub const fn is_sample(self) -> bool {
        matches!(self, Self::SampleStddev | Self::SampleVariance)
    }

    /// Returns the minimum number of observations needed for a result
    ///
    /// # Returns
    ///
    /// * `usize` - 2 for sample statistics, 1 for population statistics
    #[inline]
    pub const fn min_count(self) -> usize {
        if self.is_sample() { 2 } else { 1 }
    }

    /// Returns the canonical lower-case name of the statistic
    pub const fn name(self) -> &'static str {
        match self {
            Self::SampleStddev => "stddev_samp",
            Self::PopulationStddev => "stddev_pop",
            Self::SampleVariance => "variance_samp",
            Self::PopulationVariance => "variance_pop",
        }
    }

    /// Computes the statistic from the given aggregates
    ///
    /// # Arguments
    ///
    /// * `moments` - Running aggregates of the window
    ///
    /// # Returns
    ///
    /// * `T` - The statistic, or NaN if it is undefined for these aggregates
    pub fn calculate<T: Float>(self, moments: &Moments<T>) -> T {
        match self {
            Self::SampleStddev => sample_stddev(moments),
            Self::PopulationStddev => population_stddev(moments),
            Self::SampleVariance => sample_variance(moments),
            Self::PopulationVariance => population_variance(moments),
        }
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
