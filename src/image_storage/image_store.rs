use std::path::{Path, PathBuf};

use log::{debug, error, info};
use uuid::Uuid;

use crate::error_handling::types::UploadError;
use crate::image_storage::types::{StoredObject, UploadedFile};

/// Cache policy sent with served images. Objects are never rewritten, so
/// clients may keep them for a day.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

/// Directory-backed object store for uploaded images.
///
/// Every upload gets a fresh random name, so stored objects are immutable.
pub struct ImageStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ImageStore {
    pub fn new<P: AsRef<Path>>(dir: P, public_base_url: &str) -> Result<Self, UploadError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            error!("Failed to create image dir {}: {}", dir.display(), e);
            UploadError::DirectoryFailed {
                path: dir.display().to_string(),
                source: e,
            }
        })?;
        info!("ImageStore initialized at {}", dir.display());
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Random object name that keeps the extension of the uploaded file.
    ///
    /// A file uploaded without an extension gets one that maps back to its
    /// declared content type, so the type survives when the object is served.
    fn object_name(file: &UploadedFile) -> String {
        let id = Uuid::new_v4();
        let ext = match Path::new(&file.filename).extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => Some(ext),
            _ => file.content_type.as_deref().and_then(extension_for),
        };
        match ext {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        }
    }

    fn content_type(file: &UploadedFile) -> String {
        match file.content_type.as_deref() {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => mime_guess::from_path(&file.filename)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    /// Writes `file` under a new name and returns where it can be fetched.
    pub async fn upload(&self, file: &UploadedFile) -> Result<StoredObject, UploadError> {
        let name = Self::object_name(file);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &file.data).await.map_err(|e| {
            error!("Failed to write image {}: {}", path.display(), e);
            UploadError::WriteFailed {
                name: name.clone(),
                source: e,
            }
        })?;
        let object = StoredObject {
            url: format!("{}/{}", self.public_base_url, name),
            content_type: Self::content_type(file),
            size: file.data.len(),
            name,
        };
        debug!(
            "Stored {} byte(s) of {} as {}",
            object.size, object.content_type, object.url
        );
        Ok(object)
    }
}

/// First extension whose guessed type is `content_type` itself.
fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    mime_guess::get_mime_extensions_str(&essence)?
        .iter()
        .copied()
        .find(|ext| {
            mime_guess::from_ext(ext)
                .first()
                .is_some_and(|guess| guess.essence_str() == essence)
        })
}
