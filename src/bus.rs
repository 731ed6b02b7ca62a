use std::sync::Arc;

use mazebot_navigation::{JunctionRecord, TelemetrySink, TickRecord};
use tokio::sync::broadcast;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends to every live subscriber. Slow subscribers lag instead of blocking us.
    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// Messages the simulation publishes while it runs.
#[derive(Debug, Clone)]
pub enum Telemetry {
    Tick(TickRecord),
    Junction(JunctionRecord),
}

impl TelemetrySink for Topic<Telemetry> {
    fn on_tick(&mut self, record: &TickRecord) {
        self.publish(Telemetry::Tick(record.clone()));
    }

    fn on_junction(&mut self, record: &JunctionRecord) {
        self.publish(Telemetry::Junction(record.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazebot_navigation::{JunctionCommand, LinkAngleSet, PixelPoint, Pose, WorldPoint};

    #[tokio::test]
    async fn test_sink_publishes_to_subscribers() {
        let mut topic: Topic<Telemetry> = Topic::new(8);
        let mut rx = topic.subscribe();

        topic.on_tick(&TickRecord {
            iteration: 2,
            pixel: PixelPoint::new(25, 26),
            pose: Pose::new(0.25, 0.26, 180.0),
            reading: None,
            corrected: false,
        });
        topic.on_junction(&JunctionRecord {
            iteration: 3,
            position: WorldPoint::new(0.25, 0.27),
            heading: 180.0,
            links: LinkAngleSet::FullyOpen,
            command: JunctionCommand::End,
        });

        assert!(matches!(rx.recv().await.unwrap().as_ref(), Telemetry::Tick(t) if t.iteration == 2));
        assert!(matches!(rx.recv().await.unwrap().as_ref(), Telemetry::Junction(j) if j.iteration == 3));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let topic: Topic<u32> = Topic::new(1);
        topic.publish(7);
        let mut rx = topic.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
