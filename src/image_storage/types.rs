//! Common data types used across the image_storage subsystem.

use serde::Serialize;

/// A file received in the `image` field of a session form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name the client gave the file, used only for its extension
    pub filename: String,
    /// Declared MIME type, if the client sent one
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// An object written to image storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Random object name, keeping the uploaded file's extension
    pub name: String,
    /// Public URL the object is served from
    pub url: String,
    pub content_type: String,
    pub size: usize,
}
