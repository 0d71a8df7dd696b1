mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use super::*;

    fn lifecycle(stage: LifecycleStage) -> ModelEvent {
        ModelEvent::Lifecycle {
            entity: "post".to_string(),
            id: Some("7".to_string()),
            stage,
        }
    }

    #[test]
    fn test_null_sink() {
        let sink = NullSink;
        sink.emit(lifecycle(LifecycleStage::PreLoad));
    }

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(ModelEvent::Query {
            entity: "post".to_string(),
            stage: QueryStage::Started,
        });
        sink.emit(ModelEvent::Query {
            entity: "post".to_string(),
            stage: QueryStage::Counted {
                total: 3,
            },
        });
        sink.emit(ModelEvent::Query {
            entity: "post".to_string(),
            stage: QueryStage::Searched {
                rows: 3,
            },
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);

        assert!(matches!(
            &events[1],
            ModelEvent::Query {
                stage: QueryStage::Counted {
                    total: 3
                },
                ..
            }
        ));
        assert!(matches!(
            &events[2],
            ModelEvent::Query {
                stage: QueryStage::Searched {
                    rows: 3
                },
                ..
            }
        ));
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(lifecycle(LifecycleStage::Save));
    }

    #[test]
    fn test_collector_sink() {
        let sink = CollectorSink::default();
        assert!(sink.is_empty());

        sink.emit(lifecycle(LifecycleStage::PreSave));
        sink.emit(lifecycle(LifecycleStage::Save));
        sink.emit(ModelEvent::Query {
            entity: "post".to_string(),
            stage: QueryStage::Failed("no such table".to_string()),
        });

        assert_eq!(sink.len(), 3);
        assert_eq!(
            sink.stages(),
            vec![LifecycleStage::PreSave, LifecycleStage::Save]
        );

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_event_sink_handle() {
        let sink: EventSinkHandle = Arc::new(NullSink);
        sink.emit(lifecycle(LifecycleStage::Ghost));

        let collector = Arc::new(CollectorSink::default());
        let sink: EventSinkHandle = collector.clone();
        sink.emit(lifecycle(LifecycleStage::Create));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullSink>();
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }

    #[test]
    fn test_pre_stages() {
        assert!(LifecycleStage::PreLoadFields.is_pre());
        assert!(LifecycleStage::PreGhost.is_pre());
        assert!(!LifecycleStage::LoadFields.is_pre());
        assert!(!LifecycleStage::Save.is_pre());
    }
}
