use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlError(String),
    #[error("Argument parsing error: {0}")]
    ArgsError(String),
    #[error("Missing value: {0}")]
    MissingValue(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Failures of the session store layer.
///
/// Every message names the backend that produced it and the operation that
/// failed, so a log line alone is enough to locate the problem.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{backend}: session not found with ID {id}")]
    NotFound { backend: &'static str, id: i64 },
    #[error("{backend}: session with unassigned ID passed into {operation}")]
    UnassignedId {
        backend: &'static str,
        operation: &'static str,
    },
    #[error("{backend}: could not connect: {reason}")]
    ConnectionFailed { backend: &'static str, reason: String },
    #[error("{backend}: could not {operation} session: {reason}")]
    ReadFailed {
        backend: &'static str,
        operation: &'static str,
        reason: String,
    },
    #[error("{backend}: could not {operation} session: {reason}")]
    WriteFailed {
        backend: &'static str,
        operation: &'static str,
        reason: String,
    },
    #[error("{backend}: store is closed")]
    Closed { backend: &'static str },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StorageError::UnassignedId { .. })
    }
}

/// Malformed request input, rejected before the store is reached.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("could not read multipart form: {0}")]
    Multipart(String),
    #[error("form field {0} is not valid UTF-8")]
    InvalidUtf8(String),
    #[error("bad session id: {0}")]
    BadId(String),
    #[error("could not upload file: {0}")]
    Upload(#[from] UploadError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image storage is not configured")]
    NotConfigured,
    #[error("could not write object {name}: {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not create image directory {path}: {source}")]
    DirectoryFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("could not encode message for topic {topic}: {reason}")]
    EncodeFailed { topic: String, reason: String },
    #[error("could not deliver message to topic {topic}: {reason}")]
    DeliveryFailed { topic: String, reason: String },
    #[error("topic {topic} rejected message with status {status}")]
    Rejected { topic: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Invalid bind address {0}")]
    BadBindAddress(String),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),
    #[error("Web error: {0}")]
    Web(#[from] WebError),
}
