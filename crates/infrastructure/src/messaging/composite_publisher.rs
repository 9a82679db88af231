use async_trait::async_trait;
use domain::DomainEvent;
use domain::event::EventPublisher;
use std::sync::Arc;
use tracing::warn;

type PublishError = Box<dyn std::error::Error + Send + Sync>;

/// Delivers every event to a list of named sinks (event log, live stream).
///
/// A failing sink is logged and skipped. The call only fails when no sink
/// accepted the event.
#[derive(Default)]
pub struct CompositeEventPublisher {
    sinks: Vec<(&'static str, Arc<dyn EventPublisher>)>,
}

impl CompositeEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, name: &'static str, sink: Arc<dyn EventPublisher>) -> Self {
        self.sinks.push((name, sink));
        self
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|(name, _)| *name).collect()
    }
}

#[async_trait]
impl EventPublisher for CompositeEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        let mut failed = Vec::new();
        for (name, sink) in &self.sinks {
            if let Err(e) = sink.publish(event.clone()).await {
                warn!(sink = name, event_type = event.event_type(), error = %e, "Event sink rejected event");
                failed.push(*name);
            }
        }

        if !self.sinks.is_empty() && failed.len() == self.sinks.len() {
            return Err(format!(
                "{} not delivered to any sink ({})",
                event.event_type(),
                failed.join(", ")
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::BroadcastEventPublisher;
    use chrono::Utc;
    use uuid::Uuid;

    struct BrokenSink;

    #[async_trait]
    impl EventPublisher for BrokenSink {
        async fn publish(&self, _event: DomainEvent) -> Result<(), PublishError> {
            Err("connection refused".into())
        }
    }

    fn event() -> DomainEvent {
        DomainEvent::measurements_recorded(Uuid::new_v4(), None, 2, Utc::now())
    }

    #[tokio::test]
    async fn test_broken_sink_does_not_block_others() {
        let live = BroadcastEventPublisher::new(8);
        let mut rx = live.subscribe();
        let publisher = CompositeEventPublisher::new()
            .with_sink("event_log", Arc::new(BrokenSink))
            .with_sink("live", Arc::new(live.clone()));

        assert!(publisher.publish(event()).await.is_ok());
        assert_eq!(rx.recv().await.unwrap().event_type(), "MeasurementsRecorded");
        assert_eq!(publisher.sink_names(), vec!["event_log", "live"]);
    }

    #[tokio::test]
    async fn test_fails_when_every_sink_fails() {
        let publisher = CompositeEventPublisher::new()
            .with_sink("event_log", Arc::new(BrokenSink))
            .with_sink("archive", Arc::new(BrokenSink));

        let err = publisher.publish(event()).await.unwrap_err();
        assert!(err.to_string().contains("event_log, archive"));
    }
}
