use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error_handling::types::PublishError;

/// A message published to a named topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    /// Opaque payload, JSON text for session updates
    pub data: Vec<u8>,
    pub publish_time: DateTime<Utc>,
}

impl Message {
    pub fn new<S: Into<String>>(topic: S, data: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            data,
            publish_time: Utc::now(),
        }
    }
}

/// A publish/subscribe channel that session changes are announced on.
///
/// Delivery and ordering guarantees belong to the implementation; callers
/// treat publishing as best effort.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: Message) -> Result<(), PublishError>;
}
