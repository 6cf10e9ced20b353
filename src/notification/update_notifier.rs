use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::error_handling::types::PublishError;
use crate::notification::publisher::{Message, Publisher};

/// Announces that a session was added or modified.
///
/// The message payload is only the session ID, JSON-encoded as a single
/// number. With no publisher configured every notification is skipped.
#[derive(Clone)]
pub struct UpdateNotifier {
    publisher: Option<Arc<dyn Publisher>>,
    topic: String,
}

impl UpdateNotifier {
    pub fn new<S: Into<String>>(publisher: Arc<dyn Publisher>, topic: S) -> Self {
        Self {
            publisher: Some(publisher),
            topic: topic.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            publisher: None,
            topic: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.publisher.is_some()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publishes the update on a detached task and returns immediately.
    ///
    /// A publish failure is logged and goes no further. The returned handle
    /// exists for tests; request handlers drop it.
    pub fn notify(&self, session_id: i64) -> Option<JoinHandle<()>> {
        let publisher = self.publisher.clone()?;
        let topic = self.topic.clone();
        Some(tokio::spawn(async move {
            let result = match encode_session_id(&topic, session_id) {
                Ok(data) => publisher.publish(Message::new(topic.clone(), data)).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => info!("Published update to {} for session ID {}", topic, session_id),
                Err(e) => warn!(
                    "Could not publish update to {} for session ID {}: {}",
                    topic, session_id, e
                ),
            }
        }))
    }
}

pub fn encode_session_id(topic: &str, session_id: i64) -> Result<Vec<u8>, PublishError> {
    serde_json::to_vec(&session_id).map_err(|e| PublishError::EncodeFailed {
        topic: topic.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::BroadcastPublisher;
    use async_trait::async_trait;

    struct FailingPublisher;

    #[async_trait]
    impl Publisher for FailingPublisher {
        async fn publish(&self, message: Message) -> Result<(), PublishError> {
            Err(PublishError::DeliveryFailed {
                topic: message.topic,
                reason: "boom".into(),
            })
        }
    }

    #[test]
    fn id_is_encoded_as_a_bare_number() {
        assert_eq!(encode_session_id("t", 42).unwrap(), b"42");
    }

    #[tokio::test]
    async fn notify_publishes_the_session_id() {
        let publisher = Arc::new(BroadcastPublisher::new());
        let mut rx = publisher.subscribe("session-updates").unwrap();
        let notifier = UpdateNotifier::new(publisher.clone(), "session-updates");

        notifier.notify(7).unwrap().await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.topic, "session-updates");
        let id: i64 = serde_json::from_slice(&message.data).unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn publish_failure_does_not_escape_the_task() {
        let notifier = UpdateNotifier::new(Arc::new(FailingPublisher), "t");
        // the task completes normally even though publishing failed
        notifier.notify(1).unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_notifier_skips() {
        let notifier = UpdateNotifier::disabled();
        assert!(!notifier.is_enabled());
        assert!(notifier.notify(1).is_none());
    }
}
