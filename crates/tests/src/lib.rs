//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshots (wire format, defaults)
//! - Config → model → scheduler flows over a fake connection
//! - WebSocket streaming against a local loopback server

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, Envelope, SensorId, SensorSample, DEFAULT_SENSOR_ID};

    #[test]
    fn test_contracts_compile() {
        let _ = ConfigVersion::V1;
        assert_eq!(SensorId::default(), DEFAULT_SENSOR_ID);
    }

    #[test]
    fn test_envelope_wire_snapshot() {
        let envelope = Envelope::new("s-1".into(), 0.5, SensorSample::new(140.0, 15.5, 20.0));
        let payload = streamer::encode_envelope(&envelope).unwrap();

        assert_eq!(
            std::str::from_utf8(&payload).unwrap(),
            r#"{"sensorId":"s-1","secFromStart":0.5,"data":{"bpmChild":140.0,"uterus":15.5,"spasms":20.0}}"#
        );
    }
}

#[cfg(test)]
mod model_tests {
    use std::fs;
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SignalModel;
    use signal_models::SignalGenerator;
    use tempfile::TempDir;

    fn write_case(root: &Path, pool: &str, case: &str, bpm: &str, uterus: &str) {
        let dir = root.join(pool).join(case);
        fs::create_dir_all(dir.join("bpm")).unwrap();
        fs::create_dir_all(dir.join("uterus")).unwrap();
        fs::write(dir.join("bpm").join("0001.csv"), bpm).unwrap();
        fs::write(dir.join("uterus").join("0001.csv"), uterus).unwrap();
    }

    /// Config file → ReplayModel backed by on-disk patterns
    #[test]
    fn test_replay_from_config_tracks_recording() {
        let dir = TempDir::new().unwrap();
        let bpm = "time,value\n0,130\n30,150\n60,130\n";
        let uterus = "time,value\n0,10\n60,40\n";
        write_case(dir.path(), "regular", "r1", bpm, uterus);
        write_case(dir.path(), "hypoxia", "h1", bpm, uterus);

        let toml = format!(
            r#"
[endpoint]
address = "ws://localhost:8080/ws"

[model]
kind = "replay"
seed = 5
pattern_dir = "{}"
"#,
            dir.path().display().to_string().replace('\\', "/")
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert!(config_loader::warnings(&blueprint).is_empty());

        let mut model = SignalGenerator::from_config(&blueprint.model);
        let SignalGenerator::Replay(replay) = &model else {
            panic!("expected replay model");
        };
        assert!(replay.has_repository());

        // Both cases share the recording; population std of bpm is ~9.43, so jitter ≤ ~0.95
        for step in 0..500 {
            let t = step as f64 * 0.12;
            let sample = model.generate_next(t);
            assert!(sample.heart_rate >= 129.0 && sample.heart_rate <= 151.0);
            assert!(sample.uterine_tone >= 8.0 && sample.uterine_tone <= 42.0);
        }
    }

    #[test]
    fn test_replay_with_missing_dir_still_streams() {
        let toml = r#"
[endpoint]
address = "ws://localhost:8080/ws"

[model]
kind = "replay"
seed = 5
pattern_dir = "/nonexistent/patterns"
"#;
        let blueprint = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config_loader::warnings(&blueprint).len(), 1);

        let mut model = SignalGenerator::from_config(&blueprint.model);
        for step in 0..100 {
            assert!(model.generate_next(step as f64 * 0.12).is_well_formed());
        }
    }

    #[test]
    fn test_tls_endpoint_rejected_at_load() {
        let toml = r#"
[endpoint]
address = "wss://127.0.0.1:8443/ws"
"#;
        let err = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap_err();
        assert!(
            matches!(err, contracts::ContractError::ConfigValidation { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn test_every_model_stays_well_formed() {
        for kind in ["sinusoidal", "replay", "ctg"] {
            let toml = format!(
                "[endpoint]\naddress = \"ws://h/ws\"\n\n[model]\nkind = \"{kind}\"\nseed = 1\n"
            );
            let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
            let mut model = SignalGenerator::from_config(&blueprint.model);

            for step in 0..3000 {
                let sample = model.generate_next(step as f64 * 0.12);
                assert!(sample.is_well_formed(), "{kind} produced {sample:?}");
            }
            model.reset();
            assert!(model.generate_next(0.0).is_well_formed());
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    use bytes::Bytes;
    use contracts::{Connection, ContractError, Envelope, ModelConfig, ModelKind};
    use futures_util::StreamExt;
    use signal_models::SignalGenerator;
    use streamer::{
        decode_envelope, SchedulerConfig, StreamScheduler, StreamerError, WebSocketConnection,
        SENSOR_TOKEN_HEADER,
    };
    use tokio::net::TcpListener;
    use tokio::sync::{mpsc, oneshot};
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
    use tokio_tungstenite::tungstenite::http::StatusCode;
    use tokio_tungstenite::tungstenite::Message;

    #[derive(Default)]
    struct RecordingConnection {
        connected: bool,
        sent: Arc<StdMutex<Vec<Bytes>>>,
    }

    impl Connection for RecordingConnection {
        async fn dial(&mut self, _address: &str, _credential: Option<&str>) -> Result<(), ContractError> {
            self.connected = true;
            Ok(())
        }

        async fn send(&mut self, payload: Bytes) -> Result<(), ContractError> {
            if !self.connected {
                return Err(ContractError::NotConnected);
            }
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.connected = false;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn ctg_model(seed: u64) -> SignalGenerator {
        SignalGenerator::from_config(&ModelConfig {
            kind: ModelKind::Ctg,
            seed: Some(seed),
            ..ModelConfig::default()
        })
    }

    /// Config-driven scheduler over a fake connection, paused clock
    #[tokio::test(start_paused = true)]
    async fn test_e2e_ctg_stream_fake_connection() {
        let connection = RecordingConnection::default();
        let sent = Arc::clone(&connection.sent);

        let scheduler = StreamScheduler::new(connection, ctg_model(8), SchedulerConfig::default());
        scheduler.connect("ws://fake/ws", None).await.unwrap();
        scheduler.start_emitting().await.unwrap();

        tokio::time::sleep(Duration::from_millis(120 * 50 + 60)).await;
        scheduler.stop_emitting().await.unwrap();
        scheduler.disconnect().await.unwrap();

        let envelopes: Vec<Envelope> = sent
            .lock()
            .unwrap()
            .iter()
            .map(|p| decode_envelope(p).unwrap())
            .collect();

        assert_eq!(envelopes.len(), 50);
        for (i, envelope) in envelopes.iter().enumerate() {
            let expected = (i + 1) as f64 * 0.12;
            assert!((envelope.sec_from_start - expected).abs() < 1e-6);
            assert!((60.0..=200.0).contains(&envelope.data.bpm_child));
            assert!((0.0..=100.0).contains(&envelope.data.uterus));
            assert!((0.0..=100.0).contains(&envelope.data.spasms));
        }
        assert!(!scheduler.is_connected().await);
    }

    /// Spawn a loopback WebSocket server; returns its URL, the upgrade token
    /// it saw, and a channel of received text frames
    async fn loopback_server() -> (String, oneshot::Receiver<Option<String>>, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (token_tx, token_rx) = oneshot::channel();
        let (frame_tx, frame_rx) = mpsc::channel(256);

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                let token = request
                    .headers()
                    .get(SENSOR_TOKEN_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let _ = token_tx.send(token);
                Ok(response)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();

            while let Some(Ok(message)) = ws.next().await {
                match message {
                    Message::Text(text) => {
                        if frame_tx.send(text.as_str().to_string()).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        (format!("ws://{addr}/ws"), token_rx, frame_rx)
    }

    #[tokio::test]
    async fn test_e2e_websocket_loopback() {
        let (url, token_rx, mut frames) = loopback_server().await;

        let config = SchedulerConfig {
            sensor_id: "loopback-sensor".into(),
            cadence: Duration::from_millis(20),
        };
        let scheduler = StreamScheduler::new(WebSocketConnection::new(), ctg_model(3), config);

        scheduler.connect(&url, Some("secret-token")).await.unwrap();
        assert_eq!(token_rx.await.unwrap().as_deref(), Some("secret-token"));

        scheduler.start_emitting().await.unwrap();

        let mut received = Vec::new();
        while received.len() < 5 {
            let text = tokio::time::timeout(Duration::from_secs(5), frames.recv())
                .await
                .expect("frame within timeout")
                .expect("server alive");
            received.push(decode_envelope(text.as_bytes()).unwrap());
        }

        scheduler.stop_emitting().await.unwrap();
        scheduler.disconnect().await.unwrap();

        assert!(received.iter().all(|e| e.sensor_id == "loopback-sensor"));
        assert!(received
            .windows(2)
            .all(|w| w[1].sec_from_start > w[0].sec_from_start));
        assert!(scheduler.metrics().sent >= 5);
    }

    #[tokio::test]
    async fn test_e2e_rejected_upgrade() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |_: &Request, _: Response| -> Result<Response, ErrorResponse> {
                let mut rejection = ErrorResponse::new(Some("bad token".to_string()));
                *rejection.status_mut() = StatusCode::UNAUTHORIZED;
                Err(rejection)
            };
            let _ = tokio_tungstenite::accept_hdr_async(stream, callback).await;
        });

        let scheduler = StreamScheduler::new(
            WebSocketConnection::new(),
            ctg_model(1),
            SchedulerConfig::default(),
        );
        let err = scheduler
            .connect(&format!("ws://{addr}/ws"), Some("wrong"))
            .await
            .unwrap_err();

        match err {
            StreamerError::Contract(ContractError::Connection { message, .. }) => {
                assert!(message.contains("401"), "unexpected message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!scheduler.is_connected().await);
    }
}
