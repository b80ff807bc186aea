//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Wire contract snapshots
//! - Device callbacks -> registry -> frames -> dispatch -> outbound
//! - Config file -> frames and processors
//! - Simulated devices driving a spawned dispatch loop

#[cfg(test)]
mod contract_tests {
    use contracts::GestureMessage;

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_wire_messages_are_stable() {
        let pan = serde_json::to_string(&GestureMessage::pan(-0.05, 0.0)).unwrap();
        assert_eq!(pan, r#"{"gesture":"pan","vector":{"x":-0.05,"y":0.0}}"#);

        let zoom = serde_json::to_string(&GestureMessage::zoom(3.0)).unwrap();
        assert_eq!(zoom, r#"{"gesture":"zoom","vector":{"delta":3.0}}"#);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        DeviceEvent, DeviceKind, DeviceSerial, DeviceSource, GestureConfig, GestureMessage,
        ServerConfig,
    };
    use device_bridge::{DeviceRegistry, SimulatedConfig, SimulatedEncoder};
    use dispatcher::{ChannelOutbound, DispatchHandle, DispatchLoop, EndReason, GestureReceiver};
    use gesture_engine::{
        FrameHandle, SpinFrame, SpinGestureProcessor, TiltFrame, TiltGestureProcessor,
    };

    const ACCEL: DeviceSerial = DeviceSerial::new(596_113);
    const ENCODER: DeviceSerial = DeviceSerial::new(421_007);

    /// Frames, registry and a dispatch loop wired the way a session does it
    struct Rig {
        tilt: FrameHandle<TiltFrame>,
        spin: FrameHandle<SpinFrame>,
        registry: Arc<DeviceRegistry>,
        dispatch: DispatchLoop,
        rx: GestureReceiver,
    }

    fn rig(config: &ServerConfig) -> Rig {
        let tilt = FrameHandle::new(TiltFrame::from_config(&config.gesture).unwrap());
        let spin = FrameHandle::new(SpinFrame::from_config(&config.gesture).unwrap());
        let registry = Arc::new(
            DeviceRegistry::from_config(&config.devices, tilt.clone(), spin.clone()).unwrap(),
        );
        let (outbound, rx) = ChannelOutbound::new("test");
        let dispatch = DispatchLoop::builder()
            .tilt(TiltGestureProcessor::from_config(tilt.clone(), &config.gesture).unwrap())
            .spin(SpinGestureProcessor::new(spin.clone()))
            .outbound(Box::new(outbound))
            .interval(Duration::from_millis(5))
            .build()
            .unwrap();
        Rig {
            tilt,
            spin,
            registry,
            dispatch,
            rx,
        }
    }

    fn config_with(gesture: GestureConfig) -> ServerConfig {
        ServerConfig {
            gesture,
            ..Default::default()
        }
    }

    fn acceleration(values: [f64; 3]) -> DeviceEvent {
        DeviceEvent::Acceleration {
            serial: ACCEL,
            values,
            timestamp: 0.0,
        }
    }

    fn position_change(position_change: f64) -> DeviceEvent {
        DeviceEvent::PositionChange {
            serial: ENCODER,
            position_change,
            time_change: 8.0,
        }
    }

    fn attach_both(callback: &contracts::DeviceEventCallback) {
        callback(DeviceEvent::Attached {
            serial: ACCEL,
            kind: DeviceKind::Accelerometer,
        });
        callback(DeviceEvent::Attached {
            serial: ENCODER,
            kind: DeviceKind::Encoder,
        });
    }

    /// Callbacks from a device thread reach the wire as a pan with the
    /// configured signs applied
    #[test]
    fn test_callback_to_pan() {
        let mut rig = rig(&config_with(GestureConfig {
            queue_length: 1,
            tilt_threshold: 0.002,
            ..Default::default()
        }));
        let callback = rig.registry.callback();

        std::thread::spawn(move || {
            attach_both(&callback);
            callback(acceleration([0.1, -0.2, 0.98]));
            callback(acceleration([0.12, -0.25, 0.97]));
        })
        .join()
        .unwrap();

        assert_eq!(rig.dispatch.tick().unwrap(), 1);
        // flip_y defaults to -1
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::pan(0.02, 0.05));

        // no new sample, nothing resent
        assert_eq!(rig.dispatch.tick().unwrap(), 0);
        assert!(rig.rx.try_recv().is_err());
        assert_eq!(rig.registry.metrics().snapshot().samples_ingested, 2);
    }

    /// [0, 1, 2, 3] streamed on one axis with a window of 3
    #[test]
    fn test_axis_stream_window_contents() {
        let mut rig = rig(&config_with(GestureConfig {
            queue_length: 3,
            flip_x: 1,
            flip_y: 1,
            ..Default::default()
        }));
        let callback = rig.registry.callback();
        attach_both(&callback);

        for value in [0.0, 1.0, 2.0, 3.0] {
            callback(DeviceEvent::AxisSample {
                serial: ACCEL,
                index: 0,
                value,
                timestamp: 0.0,
            });
        }

        {
            let frame = rig.tilt.lock();
            assert_eq!(frame.x().raw().values(), vec![3.0, 2.0, 1.0]);
            assert_eq!(frame.x().deltas().values(), vec![1.0, 1.0, 1.0]);
        }

        // nothing to pan until y has a reading too
        assert_eq!(rig.dispatch.tick().unwrap(), 0);
        callback(DeviceEvent::AxisSample {
            serial: ACCEL,
            index: 1,
            value: 0.4,
            timestamp: 0.0,
        });

        // mean of the x window is 2; y sits at its own level
        rig.dispatch.tick().unwrap();
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::pan(2.0, 0.0));
    }

    /// Encoder changes 5, -3, 0 with flip_z = -1 become zooms -5, 3, 0
    #[test]
    fn test_encoder_to_zoom_sequence() {
        let mut rig = rig(&config_with(GestureConfig::default()));
        let callback = rig.registry.callback();
        attach_both(&callback);

        let mut zooms = Vec::new();
        for change in [5.0, -3.0, 0.0] {
            callback(position_change(change));
            rig.dispatch.tick().unwrap();
            zooms.push(rig.rx.try_recv().unwrap());
        }

        assert_eq!(
            zooms,
            vec![
                GestureMessage::zoom(-5.0),
                GestureMessage::zoom(3.0),
                GestureMessage::zoom(0.0)
            ]
        );
        assert_eq!(rig.spin.lock().samples_received(), 3);
    }

    /// A client that reads late gets the newest zoom, not the backlog
    #[test]
    fn test_late_reader_gets_latest_zoom() {
        let mut rig = rig(&config_with(GestureConfig::default()));
        let callback = rig.registry.callback();
        attach_both(&callback);

        for change in [1.0, 2.0, 3.0, 4.0] {
            callback(position_change(change));
            rig.dispatch.tick().unwrap();
        }

        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::zoom(-4.0));
        assert!(rig.rx.try_recv().is_err());
    }

    /// Pan and zoom in the same tick go out tilt first
    #[test]
    fn test_tilt_and_spin_in_one_tick() {
        let mut rig = rig(&config_with(GestureConfig {
            queue_length: 1,
            ..Default::default()
        }));
        let callback = rig.registry.callback();
        attach_both(&callback);

        callback(acceleration([0.0, 0.0, 1.0]));
        callback(acceleration([-0.01, 0.0, 1.0]));
        callback(position_change(2.0));

        assert_eq!(rig.dispatch.tick().unwrap(), 2);
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::pan(-0.01, 0.0));
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::zoom(-2.0));
    }

    /// Samples from serials nobody registered never reach a frame
    #[test]
    fn test_unknown_device_is_dropped() {
        let mut config = config_with(GestureConfig::default());
        config.devices.accelerometer_serial = Some(ACCEL);
        let mut rig = rig(&config);
        let callback = rig.registry.callback();

        callback(DeviceEvent::Acceleration {
            serial: DeviceSerial::new(1),
            values: [0.5, 0.5, 0.5],
            timestamp: 0.0,
        });

        assert_eq!(rig.registry.metrics().snapshot().unknown_device_drops, 1);
        assert_eq!(rig.tilt.lock().samples_received(), 0);
        assert_eq!(rig.dispatch.tick().unwrap(), 0);
    }

    /// A detached accelerometer stops panning until it attaches again
    #[test]
    fn test_detach_silences_tilt() {
        let mut rig = rig(&config_with(GestureConfig {
            queue_length: 1,
            ..Default::default()
        }));
        let callback = rig.registry.callback();
        attach_both(&callback);

        callback(acceleration([0.0, 0.0, 1.0]));
        callback(DeviceEvent::Detached { serial: ACCEL });
        callback(acceleration([0.3, 0.0, 1.0]));
        assert_eq!(rig.dispatch.tick().unwrap(), 0);

        callback(DeviceEvent::Attached {
            serial: ACCEL,
            kind: DeviceKind::Accelerometer,
        });
        assert_eq!(rig.dispatch.tick().unwrap(), 1);
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::pan(0.3, 0.0));
    }

    /// Orientation from a config file: (2, 5, 1) with flip_x = 1,
    /// flip_y = -1 and swap_xy becomes (-5, 2, 1)
    #[test]
    fn test_config_file_orientation() {
        let config = ConfigLoader::load_from_str(
            r#"
[gesture]
queue_length = 1
flip_x = 1
flip_y = -1
swap_xy = true
tilt_threshold = 0.5
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        let mut rig = rig(&config);
        let callback = rig.registry.callback();
        attach_both(&callback);

        callback(acceleration([0.0, 0.0, 0.0]));
        callback(acceleration([2.0, 5.0, 1.0]));

        assert_eq!(rig.tilt.lock().latest(), [-5.0, 2.0, 1.0]);
        rig.dispatch.tick().unwrap();
        assert_eq!(rig.rx.try_recv().unwrap(), GestureMessage::pan(-5.0, 2.0));
    }

    /// Simulated encoder feeding a spawned loop; the client going away ends
    /// the session as disconnected
    #[tokio::test]
    async fn test_simulated_session_until_disconnect() {
        let Rig {
            registry,
            dispatch,
            mut rx,
            ..
        } = rig(&config_with(GestureConfig::default()));

        let encoder = SimulatedEncoder::new(
            ENCODER,
            SimulatedConfig {
                frequency_hz: 200.0,
                amplitude: 1.0,
                period_s: 0.4,
            },
        );
        encoder.listen(registry.callback());
        let serial = registry
            .wait_for_attach(DeviceKind::Encoder, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(serial, ENCODER);

        let handle = DispatchHandle::spawn(dispatch);
        for _ in 0..2 {
            let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(message, GestureMessage::Zoom(v) if v.delta.abs() == 1.0));
        }
        drop(rx);

        let end = tokio::time::timeout(Duration::from_secs(2), handle.wait())
            .await
            .unwrap()
            .unwrap();
        encoder.stop();

        assert_eq!(end.reason, EndReason::Disconnected);
        assert!(end.metrics.zooms_sent >= 2);
        assert_eq!(end.metrics.send_failures, 1);
        assert!(end.error.is_some());
    }
}
