use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::error_handling::types::PublishError;
use crate::notification::publisher::{Message, Publisher};

/// JSON body posted for each message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    topic: &'a str,
    data: String,
    publish_time: DateTime<Utc>,
}

impl<'a> Envelope<'a> {
    fn from_message(message: &'a Message) -> Result<Self, PublishError> {
        let data = String::from_utf8(message.data.clone()).map_err(|e| PublishError::EncodeFailed {
            topic: message.topic.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            topic: &message.topic,
            data,
            publish_time: message.publish_time,
        })
    }
}

/// Publishes messages by POSTing them to an HTTP endpoint.
pub struct WebhookPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookPublisher {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(&self, message: Message) -> Result<(), PublishError> {
        let envelope = Envelope::from_message(&message)?;
        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| PublishError::DeliveryFailed {
                topic: message.topic.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                topic: message.topic.clone(),
                status: status.as_u16(),
            });
        }
        debug!("Posted message on {} to {}", message.topic, self.endpoint);
        Ok(())
    }
}
