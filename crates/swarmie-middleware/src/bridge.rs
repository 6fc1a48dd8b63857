//! JSON bridge between external clients and the [`EventBus`].
//!
//! [`SnapshotBridge`]:
//!
//! 1. **Ingests** rosbridge-style JSON messages carrying IMU and GPS samples,
//!    queues them for the localization node and mirrors them onto the bus
//!    sample topics. The same parser serves WebSocket text frames and
//!    newline-delimited input.
//!
//! 2. **Serves** a WebSocket endpoint that streams every origin and location
//!    event to connected clients as JSON.
//!
//! Accepted inbound shapes:
//!
//! ```text
//! {"op":"publish","topic":"/<name>/imu","msg":{"orientation":{"x":0,"y":0,"z":0,"w":1}}}
//! {"op":"publish","topic":"/<name>/gps","msg":{"longitude":-80.6,"latitude":28.5,"status":{"status":0}}}
//! ```

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use swarmie_types::{
    Event, EventPayload, FixStatus, OrientationSample, PositionSample, Quaternion, SwarmieError,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::bus::{EventBus, Topic};
use crate::node::SampleSender;

#[derive(Clone)]
pub struct SnapshotBridge {
    bus: EventBus,
    samples: SampleSender,
}

impl SnapshotBridge {
    pub fn new(bus: EventBus, samples: SampleSender) -> Self {
        Self { bus, samples }
    }

    // -----------------------------------------------------------------------
    // Ingest
    // -----------------------------------------------------------------------

    pub async fn ingest_orientation(&self, sample: OrientationSample) -> Result<(), SwarmieError> {
        self.ingest(Topic::Imu, EventPayload::Orientation(sample)).await
    }

    pub async fn ingest_position(&self, sample: PositionSample) -> Result<(), SwarmieError> {
        self.ingest(Topic::Gps, EventPayload::Position(sample)).await
    }

    /// Queue a sample for the node, waiting while the lane is full, and
    /// mirror it onto its bus topic.
    ///
    /// # Errors
    ///
    /// Returns [`SwarmieError::Channel`] once the node has stopped.
    async fn ingest(&self, topic: Topic, payload: EventPayload) -> Result<(), SwarmieError> {
        let event = Event::new(self.bus.topic_path(topic), payload);
        self.bus.publish_event(topic, event.clone());
        self.samples
            .send(event)
            .await
            .map_err(|_| SwarmieError::Channel("localization node stopped".to_string()))
    }

    /// Parse one inbound JSON message and queue the sample it carries.
    ///
    /// Returns `Ok(true)` when a sample was queued. Malformed messages and
    /// messages for other topics or platforms are ignored.
    pub async fn handle_incoming_message(&self, text: &str) -> Result<bool, SwarmieError> {
        match parse_sample(text, self.bus.platform()) {
            Some(EventPayload::Orientation(sample)) => {
                self.ingest_orientation(sample).await?;
                Ok(true)
            }
            Some(EventPayload::Position(sample)) => {
                self.ingest_position(sample).await?;
                Ok(true)
            }
            _ => {
                debug!(raw = text, "ignoring inbound message");
                Ok(false)
            }
        }
    }

    // -----------------------------------------------------------------------
    // WebSocket server
    // -----------------------------------------------------------------------

    /// Accept WebSocket clients on `addr` until a bind error occurs.
    ///
    /// # Errors
    ///
    /// Returns [`SwarmieError::Io`] if the TCP listener cannot be bound.
    pub async fn run_ws_server(self, addr: SocketAddr) -> Result<(), SwarmieError> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "snapshot bridge listening");

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let bridge = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = bridge.handle_ws_client(stream, peer).await {
                            error!(peer = %peer, error = %e, "ws client error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "ws accept error");
                }
            }
        }
    }

    async fn handle_ws_client(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<(), SwarmieError> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| SwarmieError::Channel(format!("ws handshake from {peer}: {e}")))?;
        debug!(peer = %peer, "ws client connected");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let mut rx = self.bus.subscribe();

        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(event) if is_output(&event.payload) => {
                            let json = serde_json::to_string(&event)
                                .map_err(|e| SwarmieError::Serialization(e.to_string()))?;
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(peer = %peer, lagged_by = n, "ws client lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        Some(Ok(Message::Text(text))) => {
                            self.handle_incoming_message(text.as_str()).await?;
                        }
                        _ => {}
                    }
                }
            }
        }

        debug!(peer = %peer, "ws client disconnected");
        Ok(())
    }
}

fn is_output(payload: &EventPayload) -> bool {
    matches!(payload, EventPayload::Origin(_) | EventPayload::Location { .. })
}

/// Extract an orientation or position sample addressed to `platform`.
pub fn parse_sample(text: &str, platform: &str) -> Option<EventPayload> {
    let json: Value = serde_json::from_str(text).ok()?;
    let topic = json.get("topic")?.as_str()?;
    let msg = json.get("msg")?;

    match Topic::from_path(topic, platform)? {
        Topic::Imu => {
            let o = msg.get("orientation")?;
            let field = |name: &str| o.get(name).and_then(Value::as_f64);
            Some(EventPayload::Orientation(OrientationSample {
                orientation: Quaternion::new(field("w")?, field("x")?, field("y")?, field("z")?),
            }))
        }
        Topic::Gps => {
            let longitude = msg.get("longitude")?.as_f64()?;
            let latitude = msg.get("latitude")?.as_f64()?;
            let code = match msg.get("status").and_then(|s| s.get("status")) {
                Some(v) => i8::try_from(v.as_i64()?).ok()?,
                None => 0,
            };
            Some(EventPayload::Position(PositionSample {
                longitude,
                latitude,
                status: FixStatus::from_code(code),
            }))
        }
        _ => None,
    }
}
