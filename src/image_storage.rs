pub mod image_store;
pub mod types;

pub use image_store::{ImageStore, IMAGE_CACHE_CONTROL};
pub use types::{StoredObject, UploadedFile};
