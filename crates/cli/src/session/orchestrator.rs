//! Session orchestrator - wires devices, frames and the dispatch loop.
//!
//! One session owns one tilt frame and one spin frame. Devices report into
//! the registry from their own threads; the dispatch loop reads the frames on
//! the runtime and hands gestures to the outbound channel until the client
//! goes away or the session is stopped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use contracts::{DeviceKind, DeviceSerial, DeviceSource, ServerConfig};
use device_bridge::{DeviceRegistry, SimulatedAccelerometer, SimulatedEncoder};
use dispatcher::{create_outbound, DispatchHandle, DispatchLoop};
use gesture_engine::{
    FrameHandle, SpinFrame, SpinGestureProcessor, TestHarnessGestureProcessor, TiltFrame,
    TiltGestureProcessor,
};
use tracing::{info, instrument, warn};

use super::SessionStats;
use crate::error::Result;

/// Serials given to simulated devices when none is configured
const SIMULATED_ACCELEROMETER_SERIAL: DeviceSerial = DeviceSerial::new(1);
const SIMULATED_ENCODER_SERIAL: DeviceSerial = DeviceSerial::new(2);

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Validated server configuration
    pub config: ServerConfig,

    /// Drive the frames from simulated devices
    pub simulate: bool,

    /// Stop the session after this long (None = until shutdown)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One gesture server session
pub struct Session {
    options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    /// Run until the client disconnects, `shutdown` resolves or the timeout
    /// expires
    #[instrument(name = "session_run", skip_all)]
    pub async fn run<S>(self, shutdown: S) -> Result<SessionStats>
    where
        S: Future<Output = ()>,
    {
        let config = &self.options.config;

        if let Some(port) = self.options.metrics_port {
            observability::init_metrics(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Frames and registry
        let tilt = FrameHandle::new(TiltFrame::from_config(&config.gesture)?);
        let spin = FrameHandle::new(SpinFrame::from_config(&config.gesture)?);
        let registry = Arc::new(DeviceRegistry::from_config(
            &config.devices,
            tilt.clone(),
            spin.clone(),
        )?);

        // Devices
        let devices = self.open_devices();
        for device in &devices {
            info!(serial = %device.serial(), kind = %device.kind(), "Starting device");
            device.listen(registry.callback());
        }

        if devices.is_empty() {
            if !config.gesture.test_harness {
                warn!("No device source configured; nothing will produce gestures");
            }
        } else {
            match registry
                .wait_for_attach(DeviceKind::Accelerometer, config.devices.attach_timeout())
                .await
            {
                Ok(serial) => info!(%serial, "Accelerometer attached"),
                Err(e) => warn!(error = %e, "Continuing without an attached accelerometer"),
            }
        }

        if config.devices.level_on_session_start {
            tilt.lock().level_table();
        }

        // Dispatch loop
        let mut builder = DispatchLoop::builder()
            .tilt(TiltGestureProcessor::from_config(tilt, &config.gesture)?)
            .spin(SpinGestureProcessor::new(spin))
            .outbound(create_outbound(&config.outbound))
            .interval(config.gesture.sample_interval()?);
        if config.gesture.test_harness {
            builder = builder.test_harness(TestHarnessGestureProcessor::with_default_script(
                &config.gesture,
            )?);
        }
        let dispatch = builder.build()?;

        info!(
            processors = ?dispatch.processor_names(),
            interval_ms = dispatch.interval().as_millis() as u64,
            "Dispatch loop starting"
        );

        let handle = DispatchHandle::spawn(dispatch);
        let trigger = handle.trigger();
        let session = handle.wait();
        tokio::pin!(session);

        let stop = stop_signal(shutdown, self.options.timeout);
        tokio::pin!(stop);

        let end = tokio::select! {
            end = &mut session => end?,
            _ = &mut stop => {
                info!("Stopping session...");
                trigger.fire();
                session.await?
            }
        };

        // Shutdown
        for device in &devices {
            device.stop();
        }

        Ok(SessionStats::new(end, registry.metrics().snapshot()))
    }

    fn open_devices(&self) -> Vec<Box<dyn DeviceSource>> {
        if !self.options.simulate {
            return Vec::new();
        }

        let devices = &self.options.config.devices;
        info!("Running with SIMULATED devices");
        vec![
            Box::new(SimulatedAccelerometer::with_defaults(
                devices
                    .accelerometer_serial
                    .unwrap_or(SIMULATED_ACCELEROMETER_SERIAL),
            )),
            Box::new(SimulatedEncoder::with_defaults(
                devices.encoder_serial.unwrap_or(SIMULATED_ENCODER_SERIAL),
            )),
        ]
    }
}

/// Resolves when `shutdown` does or when the timeout expires
async fn stop_signal<S>(shutdown: S, timeout: Option<Duration>)
where
    S: Future<Output = ()>,
{
    match timeout {
        Some(timeout) => {
            if tokio::time::timeout(timeout, shutdown).await.is_err() {
                warn!(timeout_secs = timeout.as_secs(), "Session timed out");
            }
        }
        None => shutdown.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher::EndReason;

    fn options(config: ServerConfig) -> SessionOptions {
        SessionOptions {
            config,
            simulate: false,
            timeout: None,
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_harness_session_stops_on_shutdown() {
        let mut config = ServerConfig::default();
        config.gesture.sample_rate = 0.005;
        config.gesture.test_harness = true;

        let stats = Session::new(options(config))
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(stats.end.reason, EndReason::Shutdown);
        assert!(stats.end.metrics.ticks > 0);
        assert!(stats.end.metrics.gestures_sent() > 0);
    }

    #[tokio::test]
    async fn test_timeout_ends_session() {
        let mut config = ServerConfig::default();
        config.gesture.sample_rate = 0.01;

        let mut opts = options(config);
        opts.timeout = Some(Duration::from_millis(50));

        let stats = Session::new(opts)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.end.reason, EndReason::Shutdown);
        assert_eq!(stats.end.metrics.gestures_sent(), 0);
    }

    #[tokio::test]
    async fn test_simulated_devices_feed_the_frames() {
        let mut config = ServerConfig::default();
        config.gesture.sample_rate = 0.01;
        config.devices.attach_timeout_ms = 1000;

        let mut opts = options(config);
        opts.simulate = true;

        let stats = Session::new(opts)
            .run(tokio::time::sleep(Duration::from_millis(300)))
            .await
            .unwrap();

        assert!(stats.bridge.attaches >= 1);
        assert!(stats.bridge.samples_ingested > 0);
        assert_eq!(stats.bridge.unknown_device_drops, 0);
    }
}
