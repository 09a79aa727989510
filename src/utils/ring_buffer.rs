use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Factor by which a full buffer's capacity is multiplied before the next write.
pub const GROWTH_FACTOR: usize = 2;

/// A growable circular buffer (ring buffer) holding the retained values of a window.
///
/// Values enter at the back and leave from the front, both in O(1). When a value
/// is pushed into a full buffer the storage is doubled and the retained values
/// are laid out again in logical order, so pushes are amortized O(1) and never
/// overwrite a live slot.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// The underlying storage, reserved for `cap` values up front.
    /// Slots at or past `data.len()` have never been written.
    data: Vec<T>,
    /// Number of values held before the buffer has to grow.
    cap: usize,
    /// Physical index of the oldest element (the "head").
    head: usize,
    /// Physical index where the next element will be written (the "tail").
    /// Never past `data.len()`.
    tail: usize,
    /// The current number of elements stored in the buffer.
    /// Always less than or equal to `cap`.
    len: usize,
}

/// Reserves storage for `capacity` values without aborting on failure.
fn try_alloc<T>(capacity: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(capacity)
        .map_err(|_| Error::OutOfMemory {
            requested: capacity,
        })?;
    Ok(vec)
}

impl<T: Copy> RingBuffer<T> {
    /// Creates an empty buffer able to hold `capacity` values before growing.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroCapacity`] if `capacity` is zero
    /// * [`Error::OutOfMemory`] if the storage cannot be allocated
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            data: try_alloc(capacity)?,
            cap: capacity,
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.cap
    }

    /// Appends a value at the back, growing the storage first when full.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfMemory`] if growing fails; the buffer is left unchanged
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.is_full() {
            self.grow()?;
        }
        // within the reserved capacity, so this never reallocates
        if self.tail == self.data.len() {
            self.data.push(value);
        } else {
            self.data[self.tail] = value;
        }
        self.tail = (self.tail + 1) % self.cap;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest value, or `None` if the buffer is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.data[self.head];
        self.head = (self.head + 1) % self.cap;
        self.len -= 1;
        Some(value)
    }

    /// Returns the value at logical index `i` (0 = oldest), if retained.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        if i >= self.len {
            return None;
        }
        Some(&self.data[(self.head + i) % self.cap])
    }

    /// Multiplies the capacity by [`GROWTH_FACTOR`], compacting the retained
    /// values into physical slots `0..len`.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfMemory`] if the new storage cannot be allocated or its
    ///   size overflows; the existing storage stays in place
    pub fn grow(&mut self) -> Result<()> {
        let old_capacity = self.cap;
        let mut data = old_capacity
            .checked_mul(GROWTH_FACTOR)
            .ok_or(Error::OutOfMemory {
                requested: usize::MAX,
            })
            .and_then(try_alloc)
            .inspect_err(|e| {
                log::warn!("window buffer stays at {old_capacity} values: {e}");
            })?;
        data.extend(self.iter().copied());

        let new_capacity = old_capacity * GROWTH_FACTOR;
        self.data = data;
        self.cap = new_capacity;
        self.head = 0;
        self.tail = self.len;
        log::debug!("grew window buffer from {old_capacity} to {new_capacity} values");
        Ok(())
    }

    /// Drops every retained value while keeping the allocation.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
        self.data.clear();
    }

    /// Returns an iterator over the retained values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).map(move |i| &self.data[(self.head + i) % self.cap])
    }
}
