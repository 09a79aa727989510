use num_traits::Float;

use crate::{StatisticKind, WindowState, error::Result};

/// Capacity of the buffer allocated on an aggregate's first observation.
pub const DEFAULT_INITIAL_CAPACITY: usize = 100;

/// Lifecycle stage of a [`WindowAggregate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateState {
    /// No observation seen yet, nothing allocated
    Uninitialized,
    /// Holding a window state
    Active,
    /// The final result was produced and the buffer released
    Finalized,
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Uninitialized,
    Active(WindowState<T>),
    Finalized,
}

/// One variance/standard deviation aggregation, cumulative or windowed.
///
/// This is the per-group (or per-window-partition) object a host aggregation
/// engine drives. Cumulative aggregates only ever [`insert`](Self::insert);
/// sliding-window aggregates also [`retract`](Self::retract) the oldest row
/// whenever the frame advances. Results are read with [`query`](Self::query)
/// and, once, with [`finalize`](Self::finalize).
///
/// The window state is allocated lazily by the first insert. It is released by
/// `finalize` or when the aggregate is dropped, whichever comes first, so an
/// aggregation abandoned half-way never leaks its buffer.
///
/// # Panics
///
/// `insert`, `retract`, `query` and `finalize` panic once the aggregate is
/// finalized, until it is [`reset`](Self::reset).
///
/// # Examples
///
/// ```
/// use window_variance::{StatisticKind, WindowAggregate};
///
/// let mut agg = WindowAggregate::<f64>::new();
/// for v in [1.0, 2.0, 3.0] {
///     agg.insert(v).unwrap();
/// }
/// // frame advances: 1.0 leaves, 4.0 enters
/// agg.retract();
/// agg.insert(4.0).unwrap();
///
/// let var = agg.query(StatisticKind::SampleVariance).unwrap();
/// assert!((var - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct WindowAggregate<T> {
    /// Current lifecycle slot
    slot: Slot<T>,
    /// Capacity requested when the window state gets allocated
    initial_capacity: usize,
}

impl<T: Float + Default> Default for WindowAggregate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float + Default> WindowAggregate<T> {
    /// Creates an uninitialized aggregate using [`DEFAULT_INITIAL_CAPACITY`]
    pub fn new() -> Self {
        Self::with_initial_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates an uninitialized aggregate whose buffer starts at `initial_capacity`
    ///
    /// # Arguments
    ///
    /// * `initial_capacity` - Number of values held before the buffer first grows
    ///
    /// # Panics
    ///
    /// If `initial_capacity` is zero
    pub fn with_initial_capacity(initial_capacity: usize) -> Self {
        assert!(initial_capacity > 0, "initial capacity can not be zero");
        Self {
            slot: Slot::Uninitialized,
            initial_capacity,
        }
    }

    /// Returns the lifecycle stage of the aggregate
    pub const fn state(&self) -> AggregateState {
        match self.slot {
            Slot::Uninitialized => AggregateState::Uninitialized,
            Slot::Active(_) => AggregateState::Active,
            Slot::Finalized => AggregateState::Finalized,
        }
    }

    /// Returns the capacity the window state is allocated with
    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the window state, if one is allocated
    pub const fn window(&self) -> Option<&WindowState<T>> {
        match &self.slot {
            Slot::Active(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the number of observations in the current frame
    pub fn count(&self) -> usize {
        self.window().map_or(0, WindowState::count)
    }

    /// Adds an observation (a row entering the aggregate or frame)
    ///
    /// The first insert allocates the window state.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the buffer cannot
    ///   be allocated or grown. An uninitialized aggregate stays uninitialized;
    ///   an active one keeps its previous frame.
    ///
    /// # Panics
    ///
    /// If the aggregate was already finalized
    pub fn insert(&mut self, value: T) -> Result<()> {
        match &mut self.slot {
            Slot::Active(state) => state.insert(value),
            Slot::Uninitialized => {
                let mut state = WindowState::try_new(self.initial_capacity)
                    .inspect_err(|e| log::warn!("failed to allocate window state: {e}"))?;
                log::debug!(
                    "allocated window state with capacity {}",
                    self.initial_capacity
                );
                state.insert(value)?;
                self.slot = Slot::Active(state);
                Ok(())
            }
            Slot::Finalized => panic!("insert called on a finalized aggregate"),
        }
    }

    /// Removes the oldest observation (a row leaving a sliding frame)
    ///
    /// Retracting from an empty or never-used aggregate does nothing.
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The removed observation, `None` if there was none
    ///
    /// # Panics
    ///
    /// If the aggregate was already finalized
    pub fn retract(&mut self) -> Option<T> {
        let removed = match &mut self.slot {
            Slot::Active(state) => state.retract(),
            Slot::Uninitialized => None,
            Slot::Finalized => panic!("retract called on a finalized aggregate"),
        };
        if removed.is_none() {
            log::trace!("retract on an empty window ignored");
        }
        removed
    }

    /// Host-shaped insert: a `None` (null row) is skipped
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert)
    pub fn step(&mut self, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.insert(value),
            None => Ok(()),
        }
    }

    /// Host-shaped retract: a `None` (null row) leaving the frame was never
    /// inserted, so nothing is removed
    pub fn inverse(&mut self, value: Option<T>) -> Option<T> {
        value.and_then(|_| self.retract())
    }

    /// Computes a statistic over the current frame without changing it
    ///
    /// # Arguments
    ///
    /// * `kind` - The statistic to compute
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The statistic, or `None` if the frame holds fewer than
    ///   [`kind.min_count()`](StatisticKind::min_count) observations or the
    ///   result is not finite
    ///
    /// # Panics
    ///
    /// If the aggregate was already finalized
    pub fn query(&self, kind: StatisticKind) -> Option<T> {
        match &self.slot {
            Slot::Active(state) => evaluate(state, kind),
            Slot::Uninitialized => None,
            Slot::Finalized => panic!("query called on a finalized aggregate"),
        }
    }

    /// Computes the final result and releases the window state
    ///
    /// The result is exactly what [`query`](Self::query) would return.
    ///
    /// # Panics
    ///
    /// If the aggregate was already finalized
    pub fn finalize(&mut self, kind: StatisticKind) -> Option<T> {
        let result = self.query(kind);
        log::trace!("finalized {kind} over {} observations", self.count());
        self.slot = Slot::Finalized;
        result
    }

    /// Drops any window state and returns the aggregate to `Uninitialized`
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The aggregate
    pub fn reset(&mut self) -> &mut Self {
        self.slot = Slot::Uninitialized;
        self
    }
}

fn evaluate<T: Float + Default>(state: &WindowState<T>, kind: StatisticKind) -> Option<T> {
    let moments = state.moments();
    if moments.count < kind.min_count() {
        return None;
    }
    let value = kind.calculate(&moments);
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn aggregate_of(values: &[f64]) -> WindowAggregate<f64> {
        let mut agg = WindowAggregate::<f64>::new();
        for &v in values {
            agg.insert(v).unwrap();
        }
        agg
    }

    #[test]
    fn lazily_allocates() {
        let mut agg = WindowAggregate::<f64>::new();
        assert_eq!(agg.state(), AggregateState::Uninitialized);
        assert!(agg.window().is_none());

        agg.insert(1.0).unwrap();
        assert_eq!(agg.state(), AggregateState::Active);
        assert_eq!(agg.window().map(WindowState::capacity), Some(100));
    }

    #[test]
    fn cumulative_results() {
        let agg = aggregate_of(&[1.0, 2.0, 3.0]);
        let q = |kind| agg.query(kind).unwrap();
        assert_approx_eq!(q(StatisticKind::PopulationVariance), 0.6667, 0.0001);
        assert_approx_eq!(q(StatisticKind::SampleVariance), 1.0, 1e-12);
        assert_approx_eq!(q(StatisticKind::PopulationStddev), 0.8165, 0.0001);
        assert_approx_eq!(q(StatisticKind::SampleStddev), 1.0, 1e-12);
    }

    #[test]
    fn sliding_window_results() {
        let mut agg = aggregate_of(&[1.0, 2.0, 3.0]);
        assert_eq!(agg.retract(), Some(1.0));
        agg.insert(4.0).unwrap();
        assert_approx_eq!(
            agg.query(StatisticKind::SampleVariance).unwrap(),
            1.0,
            1e-12
        );
        assert_eq!(agg.count(), 3);
    }

    #[test]
    fn insufficient_data_is_none() {
        let mut agg = WindowAggregate::<f64>::new();
        for kind in StatisticKind::ALL {
            assert_eq!(agg.query(kind), None);
        }

        agg.insert(5.0).unwrap();
        assert_eq!(agg.query(StatisticKind::PopulationVariance), Some(0.0));
        assert_eq!(agg.query(StatisticKind::PopulationStddev), Some(0.0));
        assert_eq!(agg.query(StatisticKind::SampleVariance), None);
        assert_eq!(agg.query(StatisticKind::SampleStddev), None);

        agg.retract();
        for kind in StatisticKind::ALL {
            assert_eq!(agg.query(kind), None);
        }
    }

    #[test]
    fn non_finite_results_are_none() {
        let agg = aggregate_of(&[1.0, f64::INFINITY, 3.0]);
        for kind in StatisticKind::ALL {
            assert_eq!(agg.query(kind), None);
        }
    }

    #[test]
    fn cancellation_yields_no_stddev() {
        let agg = aggregate_of(&[10_000_000.7, 10_000_000.7, 10_000_000.7]);
        assert!(agg.query(StatisticKind::PopulationVariance).unwrap() < 0.0);
        assert_eq!(agg.query(StatisticKind::PopulationStddev), None);
        assert_eq!(agg.query(StatisticKind::SampleStddev), None);
    }

    #[test]
    fn query_is_idempotent() {
        let agg = aggregate_of(&[25.4, 26.2, 26.0, 26.1]);
        for kind in StatisticKind::ALL {
            assert_eq!(agg.query(kind), agg.query(kind));
        }
    }

    #[test]
    fn retract_before_insert_is_noop() {
        let mut agg = WindowAggregate::<f64>::new();
        assert_eq!(agg.retract(), None);
        assert_eq!(agg.state(), AggregateState::Uninitialized);
    }

    #[test]
    fn finalize_releases_window() {
        let mut agg = aggregate_of(&[1.0, 2.0, 3.0]);
        let expected = agg.query(StatisticKind::SampleStddev);
        assert_eq!(agg.finalize(StatisticKind::SampleStddev), expected);
        assert_eq!(agg.state(), AggregateState::Finalized);
        assert!(agg.window().is_none());
        assert_eq!(agg.count(), 0);
    }

    #[test]
    fn finalize_without_rows_is_none() {
        let mut agg = WindowAggregate::<f64>::new();
        assert_eq!(agg.finalize(StatisticKind::PopulationVariance), None);
        assert_eq!(agg.state(), AggregateState::Finalized);
    }

    #[test]
    #[should_panic(expected = "insert called on a finalized aggregate")]
    fn insert_after_finalize_panics() {
        let mut agg = aggregate_of(&[1.0]);
        agg.finalize(StatisticKind::PopulationVariance);
        let _ = agg.insert(2.0);
    }

    #[test]
    #[should_panic(expected = "retract called on a finalized aggregate")]
    fn retract_after_finalize_panics() {
        let mut agg = aggregate_of(&[1.0]);
        agg.finalize(StatisticKind::PopulationVariance);
        agg.retract();
    }

    #[test]
    #[should_panic(expected = "query called on a finalized aggregate")]
    fn finalize_twice_panics() {
        let mut agg = aggregate_of(&[1.0]);
        agg.finalize(StatisticKind::PopulationVariance);
        agg.finalize(StatisticKind::PopulationVariance);
    }

    #[test]
    fn reset_allows_reuse() {
        let mut agg = aggregate_of(&[1.0, 2.0]);
        agg.finalize(StatisticKind::SampleVariance);
        agg.reset();
        assert_eq!(agg.state(), AggregateState::Uninitialized);

        agg.insert(5.0).unwrap();
        assert_eq!(agg.query(StatisticKind::PopulationVariance), Some(0.0));
    }

    #[test]
    fn null_rows_are_skipped() {
        let mut agg = WindowAggregate::<f64>::new();
        agg.step(Some(1.0)).unwrap();
        agg.step(None).unwrap();
        agg.step(Some(3.0)).unwrap();
        assert_eq!(agg.count(), 2);

        assert_eq!(agg.inverse(None), None);
        assert_eq!(agg.count(), 2);
        assert_eq!(agg.inverse(Some(1.0)), Some(1.0));
        assert_eq!(agg.count(), 1);
    }

    #[test]
    #[should_panic(expected = "initial capacity can not be zero")]
    fn zero_initial_capacity_panics() {
        let _ = WindowAggregate::<f64>::with_initial_capacity(0);
    }

    #[test]
    fn custom_initial_capacity_grows() {
        let mut agg = WindowAggregate::<f64>::with_initial_capacity(2);
        for v in [1.0, 2.0, 3.0] {
            agg.insert(v).unwrap();
        }
        assert_eq!(agg.window().map(WindowState::capacity), Some(4));
        assert_approx_eq!(
            agg.query(StatisticKind::SampleVariance).unwrap(),
            1.0,
            1e-12
        );
    }
}
