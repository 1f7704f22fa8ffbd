//! Dispatcher - fan-out of estimates to sinks

use tracing::{debug, info, instrument, warn};

use contracts::{ContractError, EstimateSink, SinkKind, SpeedEstimate};

use crate::error::DispatcherError;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{ConsoleSink, LogSink};

struct SinkSlot {
    sink: Box<dyn EstimateSink>,
    metrics: SinkMetrics,
}

/// Forwards every estimate to each registered sink, in registration order
pub struct Dispatcher {
    slots: Vec<SinkSlot>,
    dispatched: u64,
    closed: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            dispatched: 0,
            closed: false,
        }
    }

    /// Create a dispatcher with custom sinks
    pub fn with_sinks(sinks: Vec<Box<dyn EstimateSink>>) -> Self {
        let mut dispatcher = Self::new();
        for sink in sinks {
            dispatcher.add_sink(sink);
        }
        dispatcher
    }

    pub fn add_sink(&mut self, sink: Box<dyn EstimateSink>) {
        debug!(sink = sink.name(), "sink registered");
        self.slots.push(SinkSlot {
            sink,
            metrics: SinkMetrics::new(),
        });
    }

    pub fn sink_count(&self) -> usize {
        self.slots.len()
    }

    /// Estimates dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.slots
            .iter()
            .map(|slot| (slot.sink.name().to_string(), slot.metrics.snapshot()))
            .collect()
    }

    /// Write one estimate to every sink
    ///
    /// Stops at the first failing sink; later sinks do not see the estimate.
    #[instrument(
        level = "trace",
        name = "dispatcher_dispatch",
        skip(self, estimate),
        fields(window_index = estimate.window_index)
    )]
    pub fn dispatch(&mut self, estimate: &SpeedEstimate) -> Result<(), DispatcherError> {
        if self.closed {
            return Err(DispatcherError::Closed);
        }

        for slot in &mut self.slots {
            match slot.sink.write(estimate) {
                Ok(()) => {
                    slot.metrics.inc_write_count();
                    observability::record_estimate_dispatched(slot.sink.name(), true);
                }
                Err(e) => {
                    slot.metrics.inc_failure_count();
                    observability::record_estimate_dispatched(slot.sink.name(), false);
                    warn!(sink = slot.sink.name(), error = %e, "sink write failed");
                    return Err(e.into());
                }
            }
        }

        self.dispatched += 1;
        Ok(())
    }

    /// Flush every sink
    pub fn flush_all(&mut self) -> Result<(), DispatcherError> {
        for slot in &mut self.slots {
            slot.sink.flush()?;
            slot.metrics.inc_flush_count();
        }
        Ok(())
    }

    /// Flush and close every sink
    ///
    /// All sinks are closed even if one fails; the first error is returned.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub fn shutdown(&mut self) -> Result<(), DispatcherError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first_error = None;
        for slot in &mut self.slots {
            let result = slot.sink.flush().and_then(|()| slot.sink.close());
            if let Err(e) = result {
                warn!(sink = slot.sink.name(), error = %e, "sink close failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        info!(
            estimates = self.dispatched,
            sinks = self.slots.len(),
            "Dispatcher shutdown complete"
        );

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl EstimateSink for Dispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError> {
        self.dispatch(estimate).map_err(into_contract_error)
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.flush_all().map_err(into_contract_error)
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.shutdown().map_err(into_contract_error)
    }
}

fn into_contract_error(err: DispatcherError) -> ContractError {
    match err {
        DispatcherError::Contract(inner) => inner,
        DispatcherError::Io(inner) => ContractError::Io(inner),
        other => ContractError::sink_write("dispatcher", other.to_string()),
    }
}

/// Build the sink for one configured kind
#[instrument(name = "dispatcher_create_sink", level = "debug")]
pub fn create_sink(kind: SinkKind) -> Box<dyn EstimateSink> {
    match kind {
        SinkKind::Console => Box::new(ConsoleSink::stdout()),
        SinkKind::Log => Box::new(LogSink::new("log")),
    }
}

/// Convenience function to create a dispatcher from configured sink kinds
///
/// Duplicate kinds are registered once.
#[instrument(name = "dispatcher_create", skip(kinds), fields(sink_count = kinds.len()))]
pub fn create_dispatcher(kinds: &[SinkKind]) -> Result<Dispatcher, DispatcherError> {
    if kinds.is_empty() {
        return Err(DispatcherError::NoSinks);
    }

    let mut dispatcher = Dispatcher::new();
    let mut seen: Vec<SinkKind> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);
        dispatcher.add_sink(create_sink(kind));
    }
    Ok(dispatcher)
}
