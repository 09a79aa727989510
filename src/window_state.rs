use num_traits::Float;

use crate::{error::Result, statistic::Moments, utils::RingBuffer};

/// The retained observations of one aggregation plus their running sums.
///
/// Observations are inserted at the back and retracted from the front of a
/// growable ring buffer. `sum` and `sum_sq` are updated on every insert and
/// retract, so they always cover exactly the values currently retained and a
/// statistic never has to walk the buffer.
///
/// The sums are plain floating-point accumulators. Retraction subtracts the
/// exact value and square that were added, which keeps every operation O(1)
/// at the price of the usual cancellation error for large magnitudes; call
/// [`WindowState::recompute`] to rebuild them from the buffer.
#[derive(Debug, Clone)]
pub struct WindowState<T> {
    /// Ring buffer holding the retained observations
    buf: RingBuffer<T>,
    /// Sum of the retained observations
    sum: T,
    /// Sum of squares of the retained observations
    sum_sq: T,
}

impl<T: Float + Default> WindowState<T> {
    /// Creates an empty window state with room for `initial_capacity` values.
    ///
    /// # Arguments
    ///
    /// * `initial_capacity` - Number of values held before the first growth
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if `initial_capacity` is zero
    /// * [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the buffer cannot be allocated
    pub fn try_new(initial_capacity: usize) -> Result<Self> {
        Ok(Self {
            buf: RingBuffer::try_new(initial_capacity)?,
            sum: T::zero(),
            sum_sq: T::zero(),
        })
    }

    /// Inserts an observation at the back of the window.
    ///
    /// The caller is expected to have dropped null or non-numeric rows
    /// already; infinities are accepted and simply poison the sums.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the buffer was
    ///   full and could not grow. Nothing is inserted and the sums are untouched.
    #[inline]
    pub fn insert(&mut self, value: T) -> Result<()> {
        self.buf.push_back(value)?;
        self.sum = self.sum + value;
        self.sum_sq = self.sum_sq + value * value;
        Ok(())
    }

    /// Retracts the oldest observation from the window.
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The removed value, or `None` if the window was empty
    #[inline]
    pub fn retract(&mut self) -> Option<T> {
        let value = self.buf.pop_front()?;
        self.sum = self.sum - value;
        self.sum_sq = self.sum_sq - value * value;
        Some(value)
    }

    /// Doubles the buffer capacity ahead of time.
    ///
    /// [`insert`](Self::insert) grows on demand, so this is only useful to
    /// move the copy out of a latency-sensitive path.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfMemory`](crate::Error::OutOfMemory) if allocation fails;
    ///   the existing buffer stays valid
    pub fn grow(&mut self) -> Result<()> {
        self.buf.grow()
    }

    /// Returns the observation at logical index `i` (0 = oldest).
    #[inline]
    pub fn get_logical(&self, i: usize) -> Option<T> {
        self.buf.get(i).copied()
    }

    /// Returns an iterator over the retained observations, oldest first.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    /// Rebuilds the running sums from the retained observations, could be
    /// called to discard rounding error compounded by long insert/retract runs
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The window state
    pub fn recompute(&mut self) -> &mut Self {
        let (sum, sum_sq) = self
            .buf
            .iter()
            .fold((T::zero(), T::zero()), |(s, sq), &v| (s + v, sq + v * v));
        self.sum = sum;
        self.sum_sq = sum_sq;
        self
    }

    /// Removes every observation while keeping the allocated buffer.
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The window state
    pub fn clear(&mut self) -> &mut Self {
        self.buf.reset();
        self.sum = T::zero();
        self.sum_sq = T::zero();
        self
    }

    /// Returns the number of retained observations
    #[inline]
    pub fn count(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no observation is retained
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the number of observations the buffer holds before growing
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the running sum of the retained observations
    #[inline]
    pub fn sum(&self) -> T {
        self.sum
    }

    /// Returns the running sum of squares of the retained observations
    #[inline]
    pub fn sum_sq(&self) -> T {
        self.sum_sq
    }

    /// Returns the mean of the retained observations
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The mean, or `None` if the window is empty
    #[inline]
    pub fn mean(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        T::from(self.count()).map(|n| self.sum / n)
    }

    /// Returns a snapshot of the running aggregates
    #[inline]
    pub fn moments(&self) -> Moments<T> {
        Moments {
            count: self.count(),
            sum: self.sum,
            sum_sq: self.sum_sq,
        }
    }
}
