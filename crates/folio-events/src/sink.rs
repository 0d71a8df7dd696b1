use std::sync::mpsc::{self, Receiver, Sender};

use crate::ModelEvent;

/// Trait for consuming events.
///
/// Hosts register one implementation per context; it receives every
/// lifecycle and query event in emission order.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ModelEvent);
}

/// Channel-based event sink.
///
/// Sends events through a standard mpsc channel. The receiver end
/// can be polled by any consumer (CLI, test harness, etc.).
pub struct ChannelSink {
    sender: Sender<ModelEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<ModelEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ModelEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink for tests or headless operation.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ModelEvent) {}
}

/// Collector sink that stores all events for inspection.
///
/// Useful in tests to verify that expected events were emitted.
#[derive(Default)]
pub struct CollectorSink {
    events: std::sync::Mutex<Vec<ModelEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<ModelEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Lifecycle stages seen so far, in order.
    pub fn stages(&self) -> Vec<crate::LifecycleStage> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ModelEvent::Lifecycle {
                    stage, ..
                } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: ModelEvent) {
        self.events.lock().unwrap().push(event);
    }
}
