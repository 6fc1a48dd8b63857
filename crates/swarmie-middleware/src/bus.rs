//! Topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! Every bus is bound to one platform name and exposes the same topic paths
//! the rover has always used:
//!
//! | Topic | Path | Traffic |
//! |---|---|---|
//! | [`Topic::Imu`] | `/<name>/imu` | Orientation samples |
//! | [`Topic::Gps`] | `/<name>/gps` | Geodetic fixes |
//! | [`Topic::Origin`] | `/<name>/origin` | Locked (or degenerate) origin |
//! | [`Topic::Location`] | `/<name>/location_<frame>` | One pose per frame |
//!
//! Every published event is also mirrored onto a firehose channel
//! ([`EventBus::subscribe`]) for bridges and loggers that want everything.
//!
//! Slow subscribers lose the oldest events. The localization node therefore
//! does not read its samples from here; it is fed through
//! [`sample_channel`][crate::node::sample_channel].

use std::sync::Arc;

use swarmie_types::{Event, EventPayload, FrameId};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
pub const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes of the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Imu,
    Gps,
    Origin,
    Location(FrameId),
}

impl Topic {
    /// Last path segment, e.g. `imu` or `location_map`.
    pub fn leaf(self) -> &'static str {
        match self {
            Topic::Imu => "imu",
            Topic::Gps => "gps",
            Topic::Origin => "origin",
            Topic::Location(frame) => frame.topic_leaf(),
        }
    }

    /// Full topic path for `platform`, e.g. `/achilles/gps`.
    pub fn path(self, platform: &str) -> String {
        format!("/{platform}/{}", self.leaf())
    }

    /// Resolve a topic path published under `platform`.
    ///
    /// The leading `/` is optional. Paths of other platforms resolve to
    /// `None`.
    pub fn from_path(path: &str, platform: &str) -> Option<Topic> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let leaf = path.strip_prefix(platform)?.strip_prefix('/')?;
        match leaf {
            "imu" => Some(Topic::Imu),
            "gps" => Some(Topic::Gps),
            "origin" => Some(Topic::Origin),
            other => FrameId::ALL
                .into_iter()
                .find(|f| f.topic_leaf() == other)
                .map(Topic::Location),
        }
    }
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    platform: Arc<str>,
    firehose: broadcast::Sender<Event>,
    imu: broadcast::Sender<Event>,
    gps: broadcast::Sender<Event>,
    origin: broadcast::Sender<Event>,
    locations: [broadcast::Sender<Event>; 6],
}

impl EventBus {
    /// Create a bus for `platform` with the given per-channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, as [`broadcast::channel`] does.
    pub fn new(platform: impl Into<String>, capacity: usize) -> Self {
        let platform: String = platform.into();
        let channel = || broadcast::channel(capacity).0;
        Self {
            platform: Arc::from(platform),
            firehose: channel(),
            imu: channel(),
            gps: channel(),
            origin: channel(),
            locations: std::array::from_fn(|_| channel()),
        }
    }

    /// Platform name this bus is bound to.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Full path of `topic` on this bus.
    pub fn topic_path(&self, topic: Topic) -> String {
        topic.path(&self.platform)
    }

    /// Publish `payload` on `topic`, stamped with a fresh id and the topic
    /// path as its source.
    ///
    /// Returns the number of topic subscribers that were handed the event.
    /// `0` means nobody is listening on that topic, which is a normal
    /// condition, not an error.
    pub fn publish_to(&self, topic: Topic, payload: EventPayload) -> usize {
        self.publish_event(topic, Event::new(self.topic_path(topic), payload))
    }

    /// Publish an already stamped `event` on `topic`.
    pub fn publish_event(&self, topic: Topic, event: Event) -> usize {
        // The firehose has no subscribers when no bridge is attached.
        let _ = self.firehose.send(event.clone());
        self.topic_sender(topic).send(event).unwrap_or(0)
    }

    /// Subscribe to a single [`Topic`].
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Subscribe to every event published on any topic.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.firehose.subscribe()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Imu => &self.imu,
            Topic::Gps => &self.gps,
            Topic::Origin => &self.origin,
            Topic::Location(frame) => &self.locations[frame.index()],
        }
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Like [`recv`][Self::recv], but skips over lag with a warning and
    /// returns `None` once the bus is closed.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "TopicReceiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
