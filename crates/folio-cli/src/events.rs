use std::sync::mpsc::Receiver;

use folio_events::{ModelEvent, QueryStage};
use tracing::{debug, trace};

/// Owns the thread that drains model events into the log.
///
/// Drop every [`folio_model::ModelContext`] holding the sender before
/// calling [`EventGuard::finish`], otherwise the join never returns.
pub struct EventGuard {
    handle: Option<std::thread::JoinHandle<()>>,
}

impl EventGuard {
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

pub fn spawn_event_handler(receiver: Receiver<ModelEvent>) -> EventGuard {
    let handle = std::thread::spawn(move || {
        while let Ok(event) = receiver.recv() {
            match event {
                ModelEvent::Lifecycle {
                    entity,
                    id,
                    stage,
                } => {
                    let id = id.unwrap_or_else(|| "-".to_string());
                    trace!("{entity} {id}: {stage:?}");
                }
                ModelEvent::Query {
                    entity,
                    stage,
                } => match stage {
                    QueryStage::Started => debug!("listing {entity}"),
                    QueryStage::Counted {
                        total,
                    } => debug!("{total} {entity} row(s) match"),
                    QueryStage::Searched {
                        rows,
                    } => debug!("fetched {rows} {entity} row(s)"),
                    QueryStage::Failed(reason) => debug!("listing {entity} failed: {reason}"),
                },
            }
        }
    });

    EventGuard {
        handle: Some(handle),
    }
}
