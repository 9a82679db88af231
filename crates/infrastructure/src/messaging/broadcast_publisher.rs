use async_trait::async_trait;
use domain::DomainEvent;
use domain::event::EventPublisher;
use tokio::sync::broadcast;

/// In-process fan-out to live subscribers such as SSE clients.
///
/// Publishing with no subscriber is not an error.
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(
        &self,
        event: DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let _ = self.tx.send(event);
        Ok(())
    }
}
