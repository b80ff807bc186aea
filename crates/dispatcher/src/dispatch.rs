//! DispatchLoop - polls processors and forwards gestures

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{GestureProcessor, OutboundChannel};
use observability::{RunningStats, StatsSummary};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, DispatchMetricsSnapshot};

/// Why a dispatch session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Outbound channel reported the client gone
    Disconnected,
    /// Shutdown was requested
    Shutdown,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one dispatch session
#[derive(Debug, Clone)]
pub struct SessionEnd {
    pub reason: EndReason,
    pub duration: Duration,
    pub metrics: DispatchMetricsSnapshot,
    /// Time spent polling and sending per tick, excluding the sleep
    pub tick_duration_ms: StatsSummary,
    /// Send error that ended a disconnected session
    pub error: Option<String>,
}

/// Builder for a `DispatchLoop`
///
/// Processors run in a fixed priority order each tick: test harness, then
/// tilt, then spin, then any extra processors in insertion order.
#[derive(Default)]
pub struct DispatchLoopBuilder {
    test_harness: Option<Box<dyn GestureProcessor>>,
    tilt: Option<Box<dyn GestureProcessor>>,
    spin: Option<Box<dyn GestureProcessor>>,
    extra: Vec<Box<dyn GestureProcessor>>,
    outbound: Option<Box<dyn OutboundChannel>>,
    interval: Option<Duration>,
}

impl DispatchLoopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_harness(mut self, processor: impl GestureProcessor + 'static) -> Self {
        self.test_harness = Some(Box::new(processor));
        self
    }

    pub fn tilt(mut self, processor: impl GestureProcessor + 'static) -> Self {
        self.tilt = Some(Box::new(processor));
        self
    }

    pub fn spin(mut self, processor: impl GestureProcessor + 'static) -> Self {
        self.spin = Some(Box::new(processor));
        self
    }

    /// Append a processor after the built-in ones
    pub fn processor(mut self, processor: Box<dyn GestureProcessor>) -> Self {
        self.extra.push(processor);
        self
    }

    pub fn outbound(mut self, outbound: Box<dyn OutboundChannel>) -> Self {
        self.outbound = Some(outbound);
        self
    }

    /// Time slept between ticks (the configured `sample_rate`)
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    #[instrument(name = "dispatch_loop_build", skip(self))]
    pub fn build(self) -> Result<DispatchLoop, DispatcherError> {
        let outbound = self.outbound.ok_or(DispatcherError::MissingOutbound)?;
        let interval = self
            .interval
            .ok_or_else(|| DispatcherError::invalid_interval("interval not set"))?;
        if interval.is_zero() {
            return Err(DispatcherError::invalid_interval("interval must be > 0"));
        }

        let processors: Vec<_> = [self.test_harness, self.tilt, self.spin]
            .into_iter()
            .flatten()
            .chain(self.extra)
            .collect();
        if processors.is_empty() {
            warn!("dispatch loop built without processors");
        }

        Ok(DispatchLoop {
            processors,
            outbound,
            interval,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }
}

/// Single cooperative loop: poll every processor, send, sleep
pub struct DispatchLoop {
    processors: Vec<Box<dyn GestureProcessor>>,
    outbound: Box<dyn OutboundChannel>,
    interval: Duration,
    metrics: Arc<DispatchMetrics>,
}

impl DispatchLoop {
    pub fn builder() -> DispatchLoopBuilder {
        DispatchLoopBuilder::new()
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Processor names in polling order
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll every processor once and send what they produce
    ///
    /// Stops at the first failed send; the error is terminal for the session.
    pub fn tick(&mut self) -> Result<usize, contracts::ContractError> {
        let mut sent = 0;
        for processor in &mut self.processors {
            if !processor.run() {
                continue;
            }
            let Some(message) = processor.next_action() else {
                continue;
            };

            let kind = message.kind();
            if let Err(e) = self.outbound.send(message) {
                self.metrics.inc_send_failures();
                observability::record_send_failure(self.outbound.name());
                return Err(e);
            }
            self.metrics.inc_sent(kind);
            observability::record_gesture_sent(self.outbound.name(), kind);
            sent += 1;
        }
        Ok(sent)
    }

    /// Run until the client disconnects or shutdown is signalled
    ///
    /// Shutdown is checked between ticks, so an in-flight tick always
    /// completes. A dropped shutdown sender counts as a shutdown request.
    #[instrument(
        name = "dispatch_loop_run",
        skip(self, shutdown),
        fields(outbound = %self.outbound.name(), interval_ms = self.interval.as_millis() as u64)
    )]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SessionEnd {
        info!(processors = ?self.processor_names(), "dispatch loop started");

        let started = Instant::now();
        let mut tick_stats = RunningStats::default();
        let mut error = None;

        let reason = loop {
            if *shutdown.borrow() {
                break EndReason::Shutdown;
            }

            let tick_started = Instant::now();
            let result = self.tick();
            let elapsed_ms = tick_started.elapsed().as_secs_f64() * 1000.0;

            self.metrics.inc_ticks();
            tick_stats.push(elapsed_ms);
            observability::record_tick();
            observability::record_tick_duration_ms(elapsed_ms);

            if let Err(e) = result {
                warn!(error = %e, "outbound send failed, ending session");
                error = Some(e.to_string());
                break EndReason::Disconnected;
            }

            let ticks = self.metrics.ticks();
            if ticks.is_multiple_of(100) {
                debug!(ticks, sent = self.metrics.sent(), "dispatch progress");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break EndReason::Shutdown;
                    }
                }
            }
        };

        observability::record_session_end(reason.as_str());
        let end = SessionEnd {
            reason,
            duration: started.elapsed(),
            metrics: self.metrics.snapshot(),
            tick_duration_ms: StatsSummary::from(&tick_stats),
            error,
        };
        info!(
            reason = %end.reason,
            ticks = end.metrics.ticks,
            sent = end.metrics.gestures_sent(),
            "dispatch loop stopped"
        );
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::ChannelOutbound;
    use contracts::{ContractError, GestureMessage};
    use std::sync::Mutex;

    /// Processor that emits a fixed message every tick
    struct Constant {
        name: &'static str,
        message: GestureMessage,
        last: Option<GestureMessage>,
    }

    impl Constant {
        fn new(name: &'static str, message: GestureMessage) -> Self {
            Self {
                name,
                message,
                last: None,
            }
        }
    }

    impl GestureProcessor for Constant {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&mut self) -> bool {
            true
        }

        fn next_action(&mut self) -> Option<GestureMessage> {
            self.last = Some(self.message);
            self.last
        }

        fn last_action(&self) -> Option<&GestureMessage> {
            self.last.as_ref()
        }
    }

    /// Outbound that records messages and fails on the n-th send
    struct Recording {
        attempts: Arc<Mutex<Vec<GestureMessage>>>,
        fail_on: Option<usize>,
    }

    impl OutboundChannel for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&mut self, message: GestureMessage) -> Result<(), ContractError> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(message);
            if Some(attempts.len()) == self.fail_on {
                return Err(ContractError::channel_closed("recording", "client gone"));
            }
            Ok(())
        }
    }

    fn recording(fail_on: Option<usize>) -> (Arc<Mutex<Vec<GestureMessage>>>, Box<Recording>) {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let outbound = Recording {
            attempts: Arc::clone(&attempts),
            fail_on,
        };
        (attempts, Box::new(outbound))
    }

    #[test]
    fn test_build_orders_by_priority() {
        let (_, outbound) = recording(None);
        let dispatch = DispatchLoop::builder()
            .spin(Constant::new("spin", GestureMessage::zoom(1.0)))
            .tilt(Constant::new("tilt", GestureMessage::pan(1.0, 0.0)))
            .test_harness(Constant::new("harness", GestureMessage::zoom(9.0)))
            .outbound(outbound)
            .interval(Duration::from_millis(5))
            .build()
            .unwrap();
        assert_eq!(dispatch.processor_names(), vec!["harness", "tilt", "spin"]);
    }

    #[test]
    fn test_build_requires_outbound_and_interval() {
        let err = DispatchLoop::builder()
            .interval(Duration::from_millis(5))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DispatcherError::MissingOutbound));

        let (_, outbound) = recording(None);
        let err = DispatchLoop::builder()
            .outbound(outbound)
            .interval(Duration::ZERO)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DispatcherError::InvalidInterval { .. }));
    }

    #[test]
    fn test_tick_sends_in_priority_order() {
        let (attempts, outbound) = recording(None);
        let mut dispatch = DispatchLoop::builder()
            .spin(Constant::new("spin", GestureMessage::zoom(1.0)))
            .tilt(Constant::new("tilt", GestureMessage::pan(0.5, 0.0)))
            .outbound(outbound)
            .interval(Duration::from_millis(5))
            .build()
            .unwrap();

        assert_eq!(dispatch.tick().unwrap(), 2);
        assert_eq!(
            *attempts.lock().unwrap(),
            vec![GestureMessage::pan(0.5, 0.0), GestureMessage::zoom(1.0)]
        );
    }

    #[tokio::test]
    async fn test_disconnect_on_second_send_ends_session() {
        let (attempts, outbound) = recording(Some(2));
        let dispatch = DispatchLoop::builder()
            .tilt(Constant::new("tilt", GestureMessage::pan(0.1, 0.1)))
            .outbound(outbound)
            .interval(Duration::from_millis(2))
            .build()
            .unwrap();

        let (_tx, rx) = watch::channel(false);
        let end = dispatch.run(rx).await;

        assert_eq!(end.reason, EndReason::Disconnected);
        assert_eq!(attempts.lock().unwrap().len(), 2);
        assert_eq!(end.metrics.pans_sent, 1);
        assert_eq!(end.metrics.send_failures, 1);
        assert_eq!(end.metrics.ticks, 2);
        assert!(end.error.unwrap().contains("client gone"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_between_ticks() {
        let (outbound, mut rx) = ChannelOutbound::new("test");
        let dispatch = DispatchLoop::builder()
            .spin(Constant::new("spin", GestureMessage::zoom(-1.0)))
            .outbound(Box::new(outbound))
            .interval(Duration::from_millis(5))
            .build()
            .unwrap();

        let (tx, shutdown) = watch::channel(false);
        let task = tokio::spawn(dispatch.run(shutdown));

        assert_eq!(rx.recv().await, Some(GestureMessage::zoom(-1.0)));
        tx.send(true).unwrap();
        let end = task.await.unwrap();

        assert_eq!(end.reason, EndReason::Shutdown);
        assert!(end.metrics.ticks >= 1);
        assert_eq!(end.metrics.zooms_sent, end.metrics.ticks);
        assert_eq!(end.tick_duration_ms.count, end.metrics.ticks);
    }

    #[tokio::test]
    async fn test_already_signalled_shutdown_runs_no_tick() {
        let (attempts, outbound) = recording(None);
        let dispatch = DispatchLoop::builder()
            .tilt(Constant::new("tilt", GestureMessage::pan(1.0, 1.0)))
            .outbound(outbound)
            .interval(Duration::from_millis(5))
            .build()
            .unwrap();

        let (_tx, rx) = watch::channel(true);
        let end = dispatch.run(rx).await;
        assert_eq!(end.reason, EndReason::Shutdown);
        assert_eq!(end.metrics.ticks, 0);
        assert!(attempts.lock().unwrap().is_empty());
    }
}
