//! `swarmie-middleware` – plumbing around the localization core.
//!
//! Routes sensor samples to the core and its snapshots to the outside world
//! without caring what the numbers mean.
//!
//! # Modules
//!
//! - [`bus`] – per-platform, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.
//! - [`sink`] – [`SnapshotSink`]: the distribution boundary the core hands
//!   its snapshots to, [`BusSink`] which publishes them on the bus, and
//!   [`JsonLinesSink`] which writes them as JSON lines.
//! - [`node`] – [`LocalizationNode`]: the single task that dispatches IMU and
//!   GPS samples into the core, fed by a bounded [`sample_channel`].
//! - [`bridge`] – [`SnapshotBridge`]: JSON ingest and WebSocket fan-out.

pub mod bridge;
pub mod bus;
pub mod node;
pub mod sink;

pub use bridge::SnapshotBridge;
pub use bus::{EventBus, Topic, TopicReceiver};
pub use node::{LocalizationNode, NodeInputs, SampleSender, sample_channel};
pub use sink::{BusSink, JsonLinesSink, SnapshotSink};
