//! The distribution boundary.
//!
//! The localization core never talks to a transport. After every sample it
//! returns a [`Handoff`] and the node passes it to a [`SnapshotSink`], which
//! decides where the snapshot goes.
//!
//! - [`SnapshotSink`] – the trait every distribution target implements.
//! - [`BusSink`] – publishes onto the [`EventBus`] topics.
//! - [`JsonLinesSink`] – writes one JSON event per line to any writer.
//!
//! A pair `(A, B)` of sinks is itself a sink that feeds both, in that order.

use std::io::Write;

use swarmie_types::{Event, EventPayload, Handoff, SwarmieError};
use tracing::debug;

use crate::bus::{EventBus, Topic};

/// Receives every snapshot the core produces.
///
/// # Contract
///
/// * When `handoff.origin` is `Some`, the origin is distributed before any
///   pose.
/// * Poses are distributed in canonical frame order (Real, Raw, Gazebo, UNM,
///   Image, Map).
/// * Every call is a full snapshot; implementations need not diff.
pub trait SnapshotSink {
    fn emit(&mut self, handoff: &Handoff) -> Result<(), SwarmieError>;
}

/// The output events of one snapshot, in distribution order.
pub fn snapshot_payloads(handoff: &Handoff) -> impl Iterator<Item = (Topic, EventPayload)> + '_ {
    let origin = handoff
        .origin
        .map(|origin| (Topic::Origin, EventPayload::Origin(origin)));
    let poses = handoff.poses.iter().map(|(frame, pose)| {
        let payload = EventPayload::Location { frame, pose: *pose };
        (Topic::Location(frame), payload)
    });
    origin.into_iter().chain(poses)
}

/// Publishes each snapshot onto the per-platform bus topics.
#[derive(Debug, Clone)]
pub struct BusSink {
    bus: EventBus,
}

impl BusSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl SnapshotSink for BusSink {
    fn emit(&mut self, handoff: &Handoff) -> Result<(), SwarmieError> {
        let mut delivered = 0;
        for (topic, payload) in snapshot_payloads(handoff) {
            delivered += self.bus.publish_to(topic, payload);
        }
        debug!(
            with_origin = handoff.origin.is_some(),
            delivered,
            "snapshot published"
        );
        Ok(())
    }
}

/// Writes every output event as one line of JSON.
///
/// Each line is a serialized [`Event`] whose `source` is the topic path the
/// bus would use for it.
pub struct JsonLinesSink<W> {
    platform: String,
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(platform: impl Into<String>, writer: W) -> Self {
        Self {
            platform: platform.into(),
            writer,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn emit(&mut self, handoff: &Handoff) -> Result<(), SwarmieError> {
        for (topic, payload) in snapshot_payloads(handoff) {
            let event = Event::new(topic.path(&self.platform), payload);
            serde_json::to_writer(&mut self.writer, &event)
                .map_err(|e| SwarmieError::Serialization(e.to_string()))?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<A: SnapshotSink, B: SnapshotSink> SnapshotSink for (A, B) {
    fn emit(&mut self, handoff: &Handoff) -> Result<(), SwarmieError> {
        self.0.emit(handoff)?;
        self.1.emit(handoff)
    }
}

impl SnapshotSink for Vec<Handoff> {
    fn emit(&mut self, handoff: &Handoff) -> Result<(), SwarmieError> {
        self.push(*handoff);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::DEFAULT_CAPACITY;
    use swarmie_types::{FrameId, FramePoses, Origin, Pose2D};

    fn handoff(with_origin: bool) -> Handoff {
        let mut poses = FramePoses::default();
        for (i, (_, pose)) in poses.iter_mut().enumerate() {
            *pose = Pose2D::new(i as f64, -(i as f64), 315.0);
        }
        Handoff {
            origin: with_origin.then_some(Origin {
                x: -80.6,
                y: 28.5,
                locked: true,
            }),
            poses,
        }
    }

    #[tokio::test]
    async fn origin_first_then_frames_in_canonical_order()
    -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::new("achilles", DEFAULT_CAPACITY);
        let mut all = bus.subscribe();
        let mut sink = BusSink::new(bus.clone());

        sink.emit(&handoff(true))?;

        let first = all.recv().await?;
        assert_eq!(first.source, "/achilles/origin");
        assert!(matches!(first.payload, EventPayload::Origin(o) if o.locked));

        for expected in FrameId::ALL {
            let event = all.recv().await?;
            assert_eq!(event.source, Topic::Location(expected).path("achilles"));
            match event.payload {
                EventPayload::Location { frame, pose } => {
                    assert_eq!(frame, expected);
                    assert_eq!(pose.x, expected.index() as f64);
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
        assert!(all.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn orientation_handoff_skips_origin() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::new("achilles", DEFAULT_CAPACITY);
        let mut origin = bus.subscribe_to(Topic::Origin);
        let mut real = bus.subscribe_to(Topic::Location(FrameId::Real));
        let mut sink = BusSink::new(bus.clone());

        sink.emit(&handoff(false))?;

        assert!(real.recv().await.is_ok());
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(50), origin.recv()).await;
        assert!(result.is_err(), "origin must not be published without a fix");
        Ok(())
    }

    #[test]
    fn json_lines_sink_writes_one_event_per_line() -> Result<(), Box<dyn std::error::Error>> {
        let mut sink = JsonLinesSink::new("achilles", Vec::new());
        sink.emit(&handoff(true))?;
        sink.emit(&handoff(false))?;

        let text = String::from_utf8(sink.writer().clone())?;
        let events = text
            .lines()
            .map(serde_json::from_str::<Event>)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(events.len(), 7 + 6);
        assert_eq!(events[0].source, "/achilles/origin");
        assert_eq!(events[6].source, "/achilles/location_map");
        assert_eq!(events[7].source, "/achilles/location_real");
        assert!(matches!(events[12].payload, EventPayload::Location { frame: FrameId::Map, .. }));
        Ok(())
    }

    #[test]
    fn paired_sinks_both_receive_every_snapshot() {
        let mut sink = (Vec::<Handoff>::new(), JsonLinesSink::new("achilles", Vec::new()));
        sink.emit(&handoff(true)).unwrap();
        sink.emit(&handoff(true)).unwrap();

        assert_eq!(sink.0.len(), 2);
        let lines = sink.1.writer().split(|b| *b == b'\n').filter(|l| !l.is_empty());
        assert_eq!(lines.count(), 14);
    }

    #[test]
    fn vec_sink_records_handoffs() {
        let mut sink: Vec<Handoff> = Vec::new();
        sink.emit(&handoff(true)).unwrap();
        sink.emit(&handoff(false)).unwrap();
        assert_eq!(sink.len(), 2);
        assert!(sink[1].origin.is_none());
    }
}
