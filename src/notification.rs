//! Publish/subscribe notifications for session changes.
//!
//! - `publisher`: the `Publisher` trait and `Message` type.
//! - `broadcast_publisher`: in-process topics over tokio broadcast channels.
//! - `webhook_publisher`: HTTP POST delivery to an external endpoint.
//! - `update_notifier`: fire-and-forget "session updated" announcements.

pub mod broadcast_publisher;
pub mod publisher;
pub mod update_notifier;
pub mod webhook_publisher;

pub use broadcast_publisher::BroadcastPublisher;
pub use publisher::{Message, Publisher};
pub use update_notifier::UpdateNotifier;
pub use webhook_publisher::WebhookPublisher;
