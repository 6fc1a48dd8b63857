//! The localization node: one task that feeds samples into the core.
//!
//! A single [`LocalizationNode`] owns the [`Localizer`] and reads one bounded
//! sample lane, so exactly one handler runs at a time and the core needs no
//! locking. Producers wait for room on the lane instead of overwriting, so no
//! fix is ever skipped. Each resulting [`Handoff`][swarmie_types::Handoff]
//! goes straight to the node's [`SnapshotSink`].

use swarmie_localization::Localizer;
use swarmie_types::{Event, EventPayload, SwarmieError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::sink::SnapshotSink;

/// Producer half of the sample lane. Clone it freely.
pub type SampleSender = mpsc::Sender<Event>;

/// Consumer half of the sample lane, handed to [`LocalizationNode::run`].
pub struct NodeInputs {
    samples: mpsc::Receiver<Event>,
}

/// Create a sample lane buffering at most `capacity` samples.
///
/// # Panics
///
/// Panics if `capacity` is zero, as [`mpsc::channel`] does.
pub fn sample_channel(capacity: usize) -> (SampleSender, NodeInputs) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, NodeInputs { samples: rx })
}

pub struct LocalizationNode<S> {
    localizer: Localizer,
    sink: S,
}

impl<S: SnapshotSink> LocalizationNode<S> {
    pub fn new(localizer: Localizer, sink: S) -> Self {
        Self { localizer, sink }
    }

    /// Dispatch one event to the matching handler.
    ///
    /// Payloads that are not samples are ignored.
    pub fn on_event(&mut self, event: &Event) -> Result<(), SwarmieError> {
        let handoff = match &event.payload {
            EventPayload::Orientation(sample) => self.localizer.handle_orientation(sample),
            EventPayload::Position(sample) => self.localizer.handle_position(sample),
            other => {
                debug!(source = %event.source, payload = ?other, "ignoring non-sample event");
                return Ok(());
            }
        };
        self.sink.emit(&handoff)
    }

    /// Process samples in arrival order until every [`SampleSender`] is
    /// dropped or `shutdown` flips to `true`.
    ///
    /// On shutdown, samples already queued are still processed before
    /// returning. Returns the node so callers can inspect the final state.
    pub async fn run(
        mut self,
        inputs: NodeInputs,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Self, SwarmieError> {
        let NodeInputs { mut samples } = inputs;
        info!(heading_wrap = %self.localizer.heading_wrap(), "localization node running");

        loop {
            tokio::select! {
                event = samples.recv() => match event {
                    Some(event) => self.on_event(&event)?,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        samples.close();
        while let Ok(event) = samples.try_recv() {
            self.on_event(&event)?;
        }

        info!(origin_locked = self.localizer.origin().locked, "localization node stopped");
        Ok(self)
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{DEFAULT_CAPACITY, EventBus, Topic};
    use crate::sink::{BusSink, JsonLinesSink};
    use swarmie_types::{
        FixStatus, FrameId, Handoff, OrientationSample, PositionSample, Quaternion,
    };

    fn gps(lon: f64, lat: f64) -> Event {
        Event::new(
            "/achilles/gps",
            EventPayload::Position(PositionSample {
                longitude: lon,
                latitude: lat,
                status: FixStatus::Fix,
            }),
        )
    }

    fn imu(yaw_deg: f64) -> Event {
        Event::new(
            "/achilles/imu",
            EventPayload::Orientation(OrientationSample {
                orientation: Quaternion::from_yaw(yaw_deg.to_radians()),
            }),
        )
    }

    #[test]
    fn on_event_dispatches_by_payload() {
        let mut node = LocalizationNode::new(Localizer::default(), Vec::<Handoff>::new());

        node.on_event(&gps(-80.6, 28.5)).unwrap();
        node.on_event(&imu(45.0)).unwrap();

        let recorded = node.sink();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[0].origin.is_some());
        assert!(recorded[1].origin.is_none());
        assert!((recorded[1].poses[FrameId::Raw].theta - 315.0).abs() < 1e-9);
    }

    #[test]
    fn on_event_ignores_outputs() {
        let mut node = LocalizationNode::new(Localizer::default(), Vec::<Handoff>::new());
        node.on_event(&Event::new(
            "/achilles/origin",
            EventPayload::Origin(Default::default()),
        ))
        .unwrap();
        assert!(node.sink().is_empty());
    }

    #[tokio::test]
    async fn run_processes_samples_until_senders_drop() -> Result<(), Box<dyn std::error::Error>> {
        let (tx, inputs) = sample_channel(DEFAULT_CAPACITY);
        let (_shutdown_tx, shutdown) = watch::channel(false);

        tx.send(gps(-80.6, 28.5)).await?;
        tx.send(imu(-90.0)).await?;
        tx.send(gps(-80.5999, 28.5)).await?;
        drop(tx);

        let node = LocalizationNode::new(Localizer::default(), Vec::<Handoff>::new())
            .run(inputs, shutdown)
            .await?;

        assert_eq!(node.sink().len(), 3);
        let origin = node.localizer().origin();
        assert_eq!((origin.x, origin.y), (-80.6, 28.5));
        let unm = node.localizer().poses()[FrameId::Unm];
        assert!((unm.x - 10.0).abs() < 1e-6);
        assert!((unm.theta - 90.0).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_still_drains_queued_samples() -> Result<(), Box<dyn std::error::Error>> {
        let (tx, inputs) = sample_channel(DEFAULT_CAPACITY);
        let (shutdown_tx, shutdown) = watch::channel(false);

        for i in 0..5 {
            tx.send(gps(-80.6 + f64::from(i) * 0.0001, 28.5)).await?;
        }
        shutdown_tx.send(true)?;

        let node = LocalizationNode::new(Localizer::default(), Vec::<Handoff>::new())
            .run(inputs, shutdown)
            .await?;
        assert_eq!(node.sink().len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn burst_beyond_capacity_keeps_first_fix_as_origin()
    -> Result<(), Box<dyn std::error::Error>> {
        const FIXES: u32 = 300;
        let (tx, inputs) = sample_channel(DEFAULT_CAPACITY);
        let (shutdown_tx, shutdown) = watch::channel(false);

        let node = LocalizationNode::new(Localizer::default(), Vec::<Handoff>::new());
        let handle = tokio::spawn(node.run(inputs, shutdown));

        for i in 0..FIXES {
            tx.send(gps(-80.6 + f64::from(i) * 0.0001, 28.5)).await?;
        }
        shutdown_tx.send(true)?;

        let node = handle.await??;
        assert_eq!(node.sink().len(), FIXES as usize);
        let origin = node.localizer().origin();
        assert_eq!((origin.x, origin.y), (-80.6, 28.5));
        Ok(())
    }

    #[tokio::test]
    async fn burst_beyond_capacity_writes_seven_lines_per_fix()
    -> Result<(), Box<dyn std::error::Error>> {
        const FIXES: usize = 100;
        let (tx, inputs) = sample_channel(8);
        let (_shutdown_tx, shutdown) = watch::channel(false);

        let sink = JsonLinesSink::new("achilles", Vec::new());
        let node = LocalizationNode::new(Localizer::default(), sink);
        let handle = tokio::spawn(node.run(inputs, shutdown));

        for i in 0..FIXES {
            tx.send(gps(-80.6 + i as f64 * 0.0001, 28.5)).await?;
        }
        drop(tx);

        let node = handle.await??;
        let text = String::from_utf8(node.sink().writer().clone())?;
        assert_eq!(text.lines().count(), FIXES * 7);
        assert_eq!(text.lines().filter(|l| l.contains("/achilles/origin")).count(), FIXES);
        Ok(())
    }

    #[tokio::test]
    async fn run_publishes_snapshots_on_bus() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::new("achilles", DEFAULT_CAPACITY);
        let (tx, inputs) = sample_channel(DEFAULT_CAPACITY);
        let mut map = bus.subscribe_to(Topic::Location(FrameId::Map));
        let mut origin = bus.subscribe_to(Topic::Origin);
        let (shutdown_tx, shutdown) = watch::channel(false);

        let node = LocalizationNode::new(Localizer::default(), BusSink::new(bus.clone()));
        let handle = tokio::spawn(node.run(inputs, shutdown));

        tx.send(gps(-80.6, 28.5)).await?;
        tx.send(gps(-80.5999, 28.5)).await?;

        let first_origin = origin.recv().await?;
        assert!(matches!(first_origin.payload, EventPayload::Origin(o) if o.locked));

        let _first_map = map.recv().await?;
        match map.recv().await?.payload {
            EventPayload::Location { frame, pose } => {
                assert_eq!(frame, FrameId::Map);
                assert_eq!(pose.x, 0.0);
                assert_eq!(pose.y, 100.0);
            }
            other => panic!("unexpected payload {other:?}"),
        }

        shutdown_tx.send(true)?;
        handle.await??;
        Ok(())
    }
}
