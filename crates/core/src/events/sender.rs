use tokio::sync::mpsc;

use super::MuxEvent;

/// Handle for emitting batch events
///
/// This is cheaply cloneable and can be shared across job tasks.
/// A disabled sender, or one whose receiver was dropped, swallows events.
#[derive(Clone, Default)]
pub struct EventSender {
    tx: Option<mpsc::Sender<MuxEvent>>,
}

impl EventSender {
    /// Create a new sender from a channel sender
    pub fn new(tx: mpsc::Sender<MuxEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a sender that drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a bounded channel and a sender feeding it
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MuxEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Emit an event
    ///
    /// Waits for channel capacity while a receiver exists. If the receiver is
    /// gone the event is dropped and the caller carries on.
    pub async fn emit(&self, event: MuxEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                tracing::debug!("Event receiver gone, dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_emit_event() {
        let (sender, mut rx) = EventSender::channel(10);
        let task_id = Uuid::new_v4();

        sender.emit(MuxEvent::TaskStarted { task_id }).await;

        match rx.recv().await {
            Some(MuxEvent::TaskStarted { task_id: got }) => assert_eq!(got, task_id),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_after_receiver_dropped() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);

        // Must neither block nor panic.
        sender
            .emit(MuxEvent::AllTasksCompleted {
                completed: 0,
                failed: 0,
            })
            .await;
        sender
            .emit(MuxEvent::AllTasksCompleted {
                completed: 0,
                failed: 0,
            })
            .await;
    }

    #[tokio::test]
    async fn test_disabled_sender() {
        EventSender::disabled()
            .emit(MuxEvent::TaskStarted {
                task_id: Uuid::new_v4(),
            })
            .await;
    }
}
