//! Per-axis sample buffer with a fixed capacity.
//!
//! Holds the reconstructed base coordinate at index 0 followed by one value
//! per particle offset of the closing row. Pushing past capacity is an error,
//! never an overwrite.

use std::fmt;

use contracts::{Axis, ContractError, MAX_SAMPLES_PER_ROW};
use ringbuf::{traits::*, HeapRb};

/// Bounded, ordered sample storage for one axis
pub struct SampleBuffer {
    axis: Axis,
    values: HeapRb<f64>,
    capacity: usize,
}

impl fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("axis", &self.axis)
            .field("len", &self.values.occupied_len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl SampleBuffer {
    /// Create a buffer holding up to `capacity` samples
    ///
    /// A zero capacity is raised to one so the base value always fits.
    pub fn new(axis: Axis, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            axis,
            values: HeapRb::new(capacity),
            capacity,
        }
    }

    /// Buffer sized for a base value plus `samples_per_row` particles
    ///
    /// Counts above `MAX_SAMPLES_PER_ROW` are clamped; a larger block then
    /// fails in [`fill`](Self::fill) with `CapacityExceeded`.
    pub fn for_row(axis: Axis, samples_per_row: usize) -> Self {
        let particles = samples_per_row.min(MAX_SAMPLES_PER_ROW);
        Self::new(axis, particles.saturating_add(1))
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append one sample
    ///
    /// # Errors
    /// `ContractError::CapacityExceeded` when the buffer is full.
    #[inline]
    pub fn push(&mut self, value: f64) -> Result<(), ContractError> {
        self.values
            .try_push(value)
            .map_err(|_| ContractError::CapacityExceeded {
                capacity: self.capacity,
            })
    }

    /// Replace the contents with `base` followed by `base + offset` per offset
    pub fn fill(&mut self, base: f64, offsets: &[f64]) -> Result<(), ContractError> {
        self.clear();
        self.push(base)?;
        for offset in offsets {
            self.push(base + offset)?;
        }
        Ok(())
    }

    /// Drop every buffered sample, returning how many were removed
    pub fn clear(&mut self) -> usize {
        self.values.pop_iter().count()
    }

    /// Arithmetic mean of the first `count` samples
    ///
    /// # Errors
    /// `ContractError::InsufficientSamples` if `count` is zero or larger than
    /// the number of buffered samples.
    pub fn mean_of_first(&self, count: usize) -> Result<f64, ContractError> {
        let available = self.len();
        if count == 0 || count > available {
            return Err(ContractError::InsufficientSamples {
                requested: count,
                available,
            });
        }

        let sum: f64 = self.values.iter().take(count).sum();
        Ok(sum / count as f64)
    }

    /// Buffered samples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.values.iter()
    }
}
