//! EstimateSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, SpeedEstimate};

/// Estimate output trait
///
/// All sink implementations must implement this trait.
pub trait EstimateSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one speed estimate
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    fn close(&mut self) -> Result<(), ContractError>;
}

impl<S: EstimateSink + ?Sized> EstimateSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError> {
        (**self).write(estimate)
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), ContractError> {
        (**self).close()
    }
}

/// In-memory collector, handy for tests and batch callers
impl EstimateSink for Vec<SpeedEstimate> {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError> {
        self.push(*estimate);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
