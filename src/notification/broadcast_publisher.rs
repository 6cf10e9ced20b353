use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, trace};
use tokio::sync::broadcast;

use crate::error_handling::types::PublishError;
use crate::notification::publisher::{Message, Publisher};

/// Messages a slow subscriber may fall behind by before it starts losing them
const TOPIC_CAPACITY: usize = 256;

/// In-process publish/subscribe with one broadcast channel per topic.
///
/// Topics are created on first use by either side. Publishing to a topic with
/// no subscribers succeeds and the message is dropped.
pub struct BroadcastPublisher {
    topics: Mutex<HashMap<String, broadcast::Sender<Message>>>,
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, topic: &str) -> Result<broadcast::Sender<Message>, PublishError> {
        let mut topics = self.topics.lock().map_err(|_| PublishError::DeliveryFailed {
            topic: topic.to_string(),
            reason: "topic table mutex poisoned".into(),
        })?;
        Ok(topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone())
    }

    pub fn subscribe(&self, topic: &str) -> Result<broadcast::Receiver<Message>, PublishError> {
        debug!("New subscriber on topic {}", topic);
        Ok(self.sender(topic)?.subscribe())
    }
}

#[async_trait]
impl Publisher for BroadcastPublisher {
    async fn publish(&self, message: Message) -> Result<(), PublishError> {
        let sender = self.sender(&message.topic)?;
        let topic = message.topic.clone();
        match sender.send(message) {
            Ok(receivers) => trace!("Delivered message on {} to {} subscriber(s)", topic, receivers),
            Err(_) => trace!("No subscribers on {}, message dropped", topic),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_messages() {
        let publisher = BroadcastPublisher::new();
        let mut a = publisher.subscribe("updates").unwrap();
        let mut b = publisher.subscribe("updates").unwrap();
        publisher
            .publish(Message::new("updates", b"42".to_vec()))
            .await
            .unwrap();
        assert_eq!(a.recv().await.unwrap().data, b"42");
        assert_eq!(b.recv().await.unwrap().data, b"42");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let publisher = BroadcastPublisher::new();
        let mut other = publisher.subscribe("other").unwrap();
        publisher
            .publish(Message::new("updates", b"1".to_vec()))
            .await
            .unwrap();
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_ok() {
        let publisher = BroadcastPublisher::new();
        publisher
            .publish(Message::new("nobody-listens", b"1".to_vec()))
            .await
            .unwrap();
    }
}
