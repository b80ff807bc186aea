//! Simulated devices
//!
//! Implement `DeviceSource` and emit events from a background thread at a
//! fixed rate, the way the vendor SDK does. Used with `--simulate` and in
//! tests when no hardware is attached.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use contracts::{DeviceEvent, DeviceEventCallback, DeviceKind, DeviceSerial, DeviceSource};
use tracing::{debug, trace};

/// Simulated device configuration
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Report frequency (Hz)
    pub frequency_hz: f64,
    /// Peak tilt in g (accelerometer) or ticks per report (encoder)
    pub amplitude: f64,
    /// Seconds per full motion cycle
    pub period_s: f64,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 60.0,
            amplitude: 0.05,
            period_s: 8.0,
        }
    }
}

impl SimulatedConfig {
    fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.frequency_hz).unwrap_or(Duration::from_millis(16))
    }
}

/// Background emitter shared by both simulated devices
#[derive(Debug)]
struct Emitter {
    serial: DeviceSerial,
    kind: DeviceKind,
    config: SimulatedConfig,
    listening: Arc<AtomicBool>,
}

impl Emitter {
    fn new(serial: DeviceSerial, kind: DeviceKind, config: SimulatedConfig) -> Self {
        Self {
            serial,
            kind,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the report thread; `sample` maps elapsed seconds to an event
    fn start<F>(&self, callback: DeviceEventCallback, mut sample: F)
    where
        F: FnMut(f64) -> Option<DeviceEvent> + Send + 'static,
    {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let serial = self.serial;
        let kind = self.kind;
        let interval = self.config.interval();
        let listening = Arc::clone(&self.listening);

        thread::spawn(move || {
            let start = Instant::now();
            debug!(%serial, %kind, ?interval, "simulated device started");
            callback(DeviceEvent::Attached { serial, kind });

            while listening.load(Ordering::Relaxed) {
                if let Some(event) = sample(start.elapsed().as_secs_f64()) {
                    trace!(%serial, ?event, "simulated event");
                    callback(event);
                }
                thread::sleep(interval);
            }

            callback(DeviceEvent::Detached { serial });
            debug!(%serial, %kind, "simulated device stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

/// Accelerometer tracing a slow circle around level
#[derive(Debug)]
pub struct SimulatedAccelerometer {
    emitter: Emitter,
}

impl SimulatedAccelerometer {
    pub fn new(serial: DeviceSerial, config: SimulatedConfig) -> Self {
        Self {
            emitter: Emitter::new(serial, DeviceKind::Accelerometer, config),
        }
    }

    pub fn with_defaults(serial: DeviceSerial) -> Self {
        Self::new(serial, SimulatedConfig::default())
    }

    /// Reading at `t` seconds; level at t = 0
    fn reading(config: &SimulatedConfig, t: f64) -> [f64; 3] {
        let phase = TAU * t / config.period_s;
        let x = config.amplitude * phase.sin();
        let y = config.amplitude * (1.0 - phase.cos());
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        [x, y, z]
    }
}

impl DeviceSource for SimulatedAccelerometer {
    fn serial(&self) -> DeviceSerial {
        self.emitter.serial
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Accelerometer
    }

    fn listen(&self, callback: DeviceEventCallback) {
        let serial = self.emitter.serial;
        let config = self.emitter.config.clone();
        self.emitter.start(callback, move |t| {
            Some(DeviceEvent::Acceleration {
                serial,
                values: Self::reading(&config, t),
                timestamp: t,
            })
        });
    }

    fn stop(&self) {
        self.emitter.stop();
    }

    fn is_listening(&self) -> bool {
        self.emitter.is_listening()
    }
}

/// Encoder alternating between turning one way, pausing and turning back
#[derive(Debug)]
pub struct SimulatedEncoder {
    emitter: Emitter,
}

impl SimulatedEncoder {
    pub fn new(serial: DeviceSerial, config: SimulatedConfig) -> Self {
        Self {
            emitter: Emitter::new(serial, DeviceKind::Encoder, config),
        }
    }

    pub fn with_defaults(serial: DeviceSerial) -> Self {
        Self::new(
            serial,
            SimulatedConfig {
                frequency_hz: 20.0,
                amplitude: 1.0,
                ..Default::default()
            },
        )
    }

    /// Position change at `t` seconds; `None` during pauses
    fn change(config: &SimulatedConfig, t: f64) -> Option<f64> {
        let quarter = ((4.0 * t / config.period_s).floor() as i64).rem_euclid(4);
        match quarter {
            0 => Some(config.amplitude),
            2 => Some(-config.amplitude),
            _ => None,
        }
    }
}

impl DeviceSource for SimulatedEncoder {
    fn serial(&self) -> DeviceSerial {
        self.emitter.serial
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Encoder
    }

    fn listen(&self, callback: DeviceEventCallback) {
        let serial = self.emitter.serial;
        let config = self.emitter.config.clone();
        let interval_ms = self.emitter.config.interval().as_secs_f64() * 1000.0;
        self.emitter.start(callback, move |t| {
            Self::change(&config, t).map(|position_change| DeviceEvent::PositionChange {
                serial,
                position_change,
                time_change: interval_ms,
            })
        });
    }

    fn stop(&self) {
        self.emitter.stop();
    }

    fn is_listening(&self) -> bool {
        self.emitter.is_listening()
    }
}
