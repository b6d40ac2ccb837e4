//! Progress event port
//!
//! The core only needs a `publish(event)` capability. Transports (terminal
//! progress bars, JSONL logs, sockets) implement it outside the core.

use council_domain::ProgressEvent;
use std::sync::Arc;

/// Sink for progress events
///
/// Called from the coordinator's task between awaits, so implementations
/// must not block for long.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &ProgressEvent);
}

/// No-op publisher for when progress reporting is not needed
pub struct NoEvents;

impl EventPublisher for NoEvents {
    fn publish(&self, _event: &ProgressEvent) {}
}

/// A publisher that delegates every event to several inner publishers
#[derive(Default, Clone)]
pub struct FanoutPublisher {
    delegates: Vec<Arc<dyn EventPublisher>>,
}

impl FanoutPublisher {
    pub fn new(delegates: Vec<Arc<dyn EventPublisher>>) -> Self {
        Self { delegates }
    }

    pub fn with(mut self, delegate: Arc<dyn EventPublisher>) -> Self {
        self.delegates.push(delegate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl EventPublisher for FanoutPublisher {
    fn publish(&self, event: &ProgressEvent) {
        for d in &self.delegates {
            d.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl EventPublisher for Recorder {
        fn publish(&self, event: &ProgressEvent) {
            self.0.lock().unwrap().push(event.event_type().to_string());
        }
    }

    #[test]
    fn test_fanout_reaches_every_delegate() {
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let fanout = FanoutPublisher::default().with(a.clone()).with(b.clone());

        fanout.publish(&ProgressEvent::phase_change("s", "draft", vec![]));

        assert_eq!(*a.0.lock().unwrap(), vec!["phase_change"]);
        assert_eq!(*b.0.lock().unwrap(), vec!["phase_change"]);
    }
}
