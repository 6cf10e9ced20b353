//! Session form decoding.
//!
//! Create and update requests are `multipart/form-data` bodies with one text
//! field per session property and an optional `image` file.

use bytes::Buf;
use futures_util::{pin_mut, TryStreamExt};
use warp::multipart::{FormData, Part};

use crate::error_handling::types::FormError;
use crate::image_storage::types::UploadedFile;
use crate::storage::types::Session;

/// Largest accepted form body (32 MiB)
pub const MAX_FORM_BYTES: u64 = 32 << 20;

/// Name of the file field holding an uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Raw values of a submitted session form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionForm {
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub video_url: String,
    pub description: String,
    pub created_by: String,
    pub created_by_id: String,
    pub image: Option<UploadedFile>,
}

impl SessionForm {
    /// Stores a text field. Unknown field names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "author" => &mut self.author,
            "publishedDate" => &mut self.published_date,
            "videoURL" => &mut self.video_url,
            "description" => &mut self.description,
            "createdBy" => &mut self.created_by,
            "createdByID" => &mut self.created_by_id,
            _ => return,
        };
        *slot = value;
    }

    /// Builds the session the form describes.
    ///
    /// `uploaded_url` is the public URL of the stored `image`, if one was
    /// uploaded; it takes the place of the `videoURL` field. A form without a
    /// creator ID produces an anonymous session.
    pub fn into_session(self, uploaded_url: Option<String>) -> Session {
        let mut session = Session {
            id: 0,
            title: self.title,
            author: self.author,
            published_date: self.published_date,
            video_url: uploaded_url.unwrap_or(self.video_url),
            description: self.description,
            created_by: self.created_by,
            created_by_id: self.created_by_id,
        };
        if session.created_by_id.is_empty() {
            session.set_creator_anonymous();
        }
        session
    }
}

/// Appends every remaining byte of `buf`, which may span several chunks.
fn drain_into<B: Buf>(acc: &mut Vec<u8>, mut buf: B) {
    while buf.has_remaining() {
        let chunk = buf.chunk();
        let n = chunk.len();
        acc.extend_from_slice(chunk);
        buf.advance(n);
    }
}

async fn read_part(part: Part) -> Result<Vec<u8>, FormError> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, buf| async move {
            drain_into(&mut acc, buf);
            Ok::<_, warp::Error>(acc)
        })
        .await
        .map_err(|e| FormError::Multipart(e.to_string()))
}

/// Reads every part of a multipart body into a [`SessionForm`].
pub async fn read_form(form: FormData) -> Result<SessionForm, FormError> {
    pin_mut!(form);
    let mut out = SessionForm::default();
    while let Some(part) = form
        .try_next()
        .await
        .map_err(|e| FormError::Multipart(e.to_string()))?
    {
        let name = part.name().to_string();
        let filename = part.filename().map(str::to_string);
        let content_type = part.content_type().map(str::to_string);
        let data = read_part(part).await?;

        if name == IMAGE_FIELD {
            // browsers send an empty, unnamed file part when nothing was picked
            match filename {
                Some(filename) if !filename.is_empty() || !data.is_empty() => {
                    out.image = Some(UploadedFile {
                        filename,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
            continue;
        }

        let value = String::from_utf8(data).map_err(|_| FormError::InvalidUtf8(name.clone()))?;
        out.set_field(&name, value);
    }
    Ok(out)
}
