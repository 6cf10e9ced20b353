use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::configuration::config::Config;
use crate::configuration::types::StorageBackend;
use crate::error_handling::types::*;
use crate::image_storage::ImageStore;
use crate::notification::{BroadcastPublisher, UpdateNotifier, WebhookPublisher};
use crate::storage::{DatabaseStorage, MemoryStorage, SessionStore};
use crate::web_interface::{AppState, WebServer};

/// Owns every long-lived component of the service.
///
/// All of them are built once from the [`Config`] and handed to the web
/// layer through [`AppState`].
pub struct Controller {
    pub config: Config,
    state: AppState,
}

impl Controller {
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Building controller");
        config.validate()?;

        let store = open_store(&config).await?;
        let mut state = AppState::new(store).with_notifier(build_notifier(&config));
        if let Some(images) = open_images(&config)? {
            state = state.with_images(images);
        }

        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve HTTP until the server stops or Ctrl-C is received, then close
    /// the session store.
    pub async fn run(&self) -> Result<(), ControllerError> {
        info!("Starting web server");
        let server = WebServer::new(self.state.clone());
        let result = tokio::select! {
            res = server.start(&self.config.bind_address, self.config.port) => res.map_err(ControllerError::from),
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Shutdown requested"),
                    Err(e) => error!("Could not listen for shutdown signal: {}", e),
                }
                Ok(())
            }
        };
        self.shutdown().await;
        result
    }

    pub async fn shutdown(&self) {
        info!("Shutting down controller");
        self.state.store.close().await;
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>, ControllerError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory session store");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Database => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                ConfigError::MissingValue("database_url is required by the database storage backend".into())
            })?;
            info!("Using database session store");
            Ok(Arc::new(DatabaseStorage::connect(url).await?))
        }
    }
}

fn open_images(config: &Config) -> Result<Option<Arc<ImageStore>>, ControllerError> {
    let Some(ref dir) = config.image_dir else {
        info!("No image directory configured, image uploads are disabled");
        return Ok(None);
    };
    let store = ImageStore::new(dir, &config.image_base_url)?;
    info!(
        "Storing uploaded images in {} (served under {})",
        dir.display(),
        config.image_base_url
    );
    Ok(Some(Arc::new(store)))
}

fn build_notifier(config: &Config) -> UpdateNotifier {
    let Some(ref topic) = config.pubsub_topic else {
        info!("No pub/sub topic configured, update notifications are disabled");
        return UpdateNotifier::disabled();
    };

    if let Some(ref endpoint) = config.pubsub_endpoint {
        let publisher = WebhookPublisher::new(endpoint.as_str());
        info!("Publishing updates on {} to {}", topic, publisher.endpoint());
        return UpdateNotifier::new(Arc::new(publisher), topic.as_str());
    }

    info!("Publishing updates on {} in-process", topic);
    let publisher = Arc::new(BroadcastPublisher::new());
    match publisher.subscribe(topic) {
        Ok(mut rx) => {
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(message) => debug!(
                            "Update on {}: {}",
                            message.topic,
                            String::from_utf8_lossy(&message.data)
                        ),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Update log subscriber skipped {} message(s)", skipped)
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }
        Err(e) => warn!("Could not attach update log subscriber: {}", e),
    }
    UpdateNotifier::new(publisher, topic.as_str())
}
