// src/telemetry/mod.rs

//! Timing, latency-budget checks and lifecycle events.
//!
//! The simulation core never reads a wall clock directly. Operations take a
//! [`Stopwatch`] reading from an injected [`Clock`] at their two boundaries and
//! hand the outcome to a [`TelemetrySink`]. Sinks are fire-and-forget: they
//! must return promptly and never fail the operation that reported to them.

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle milestones reported for observability integration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Initializing,
    Initialized { max_qubits: usize },
    CircuitCreated { id: String, qubits: usize, gates: usize },
    CircuitExecuted { id: String, outcomes: usize },
    CircuitRemoved { id: String },
}

/// Everything the simulator reports to its telemetry sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// An operation ran longer than its advisory budget.
    LatencyExceeded { operation: String, elapsed: Duration, budget: Duration },
    /// Per-operation timing.
    OperationTimed { operation: String, elapsed: Duration },
    /// A state dropped below the decoherence threshold.
    DecoherenceDetected { circuit: String, coherence_time: f64, corrected: bool },
    Lifecycle(LifecycleEvent),
}

/// Receiver of telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records an event. Must not block the caller.
    fn record(&self, event: TelemetryEvent);
}

/// Emits every event as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::LatencyExceeded { operation, elapsed, budget } => {
                warn!(%operation, ?elapsed, ?budget, "operation exceeded latency budget");
            }
            TelemetryEvent::OperationTimed { operation, elapsed } => {
                debug!(%operation, ?elapsed, "operation timed");
            }
            TelemetryEvent::DecoherenceDetected { circuit, coherence_time, corrected } => {
                if corrected {
                    debug!(%circuit, coherence_time, "decoherence corrected");
                } else {
                    warn!(%circuit, coherence_time, "decoherence detected, error correction disabled");
                }
            }
            TelemetryEvent::Lifecycle(event) => info!(?event, "lifecycle"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Keeps events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards events over a channel, dropping them when the channel is full
/// or disconnected.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<TelemetryEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<TelemetryEvent>) -> Self {
        Self { sender }
    }
}

impl TelemetrySink for ChannelSink {
    fn record(&self, event: TelemetryEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("telemetry channel full, event dropped"),
            Err(TrySendError::Disconnected(_)) => debug!("telemetry channel closed, event dropped"),
        }
    }
}

/// Source of monotonic time readings.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reads [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A started timing of one operation.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start(clock: &dyn Clock) -> Self {
        Self { started: clock.now() }
    }

    /// Time elapsed since `start`, saturating at zero.
    pub fn elapsed(&self, clock: &dyn Clock) -> Duration {
        clock.now().saturating_duration_since(self.started)
    }
}

/// Sink and clock bundled for the components that report timings.
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
    clock: Arc<dyn Clock>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink), Arc::new(SystemClock))
    }
}

impl Telemetry {
    pub fn new(sink: Arc<dyn TelemetrySink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// Tracing sink with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(TracingSink), clock)
    }

    pub fn record(&self, event: TelemetryEvent) {
        self.sink.record(event);
    }

    pub fn lifecycle(&self, event: LifecycleEvent) {
        self.sink.record(TelemetryEvent::Lifecycle(event));
    }

    /// Starts timing an operation.
    pub fn start(&self) -> Stopwatch {
        Stopwatch::start(self.clock.as_ref())
    }

    /// Stops timing `operation`, records the timing and, when `budget` was
    /// exceeded, a `LatencyExceeded` warning. Returns the elapsed time.
    pub fn finish(&self, stopwatch: Stopwatch, operation: &str, budget: Duration) -> Duration {
        let elapsed = stopwatch.elapsed(self.clock.as_ref());
        self.sink.record(TelemetryEvent::OperationTimed { operation: operation.to_string(), elapsed });
        if elapsed > budget {
            self.sink.record(TelemetryEvent::LatencyExceeded {
                operation: operation.to_string(),
                elapsed,
                budget,
            });
        }
        elapsed
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}
