use std::sync::Arc;

use cowave_backend::{Backend, Filter, SelectQuery};
use cowave_types::api::UploadRequest;
use cowave_types::{Attachment, DataError, DataResult};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::rows::AttachmentRow;
use crate::urlcache::{DEFAULT_TTL_SECS, SignedUrlCache};
use crate::{backend_error, parse_row};

pub const ATTACHMENT_BUCKET: &str = "attachments";
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Outcome of a delete. The metadata row is gone either way; when the stored
/// object could not be removed, `notice` carries the softened message to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDeletion {
    pub object_removed: bool,
    pub notice: Option<&'static str>,
}

const DELETE_NOTICE: &str =
    "Attachment removed. The file itself might take a moment to disappear.";

pub struct AttachmentRepo<B: Backend> {
    backend: Arc<B>,
    urls: SignedUrlCache,
}

impl<B: Backend> AttachmentRepo<B> {
    pub fn new(backend: Arc<B>, urls: SignedUrlCache) -> Self {
        Self { backend, urls }
    }

    /// Uploads an image and links it to its comment.
    ///
    /// Object storage and the metadata table are independent systems with no
    /// cross-store atomicity, so this is a two-step saga: upload the object,
    /// insert the row, and on a failed insert compensate by deleting the
    /// just-uploaded object. The compensation is best effort; its own failure
    /// is logged and swallowed.
    pub async fn upload(&self, req: UploadRequest) -> DataResult<Attachment> {
        if !ALLOWED_MIME_TYPES.contains(&req.mime_type.as_str()) {
            return Err(DataError::validation(
                "That file type isn't supported. Use a JPEG, PNG, WebP or GIF image.",
            ));
        }
        if req.bytes.is_empty() {
            return Err(DataError::validation("That file is empty."));
        }
        if req.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(DataError::validation("Images can be up to 5 MB."));
        }

        let extension = extension_for(&req.mime_type, &req.file_name);
        let object_path = format!(
            "{}/{}/{}.{extension}",
            req.user_id,
            req.comment_id,
            Uuid::new_v4()
        );

        let byte_size = req.bytes.len();
        self.backend
            .upload_object(ATTACHMENT_BUCKET, &object_path, &req.mime_type, req.bytes)
            .await
            .map_err(|e| backend_error("uploading the image", e))?;

        let inserted = self
            .backend
            .insert(
                "attachments",
                json!({
                    "comment_id": req.comment_id,
                    "user_id": req.user_id,
                    "bucket_id": ATTACHMENT_BUCKET,
                    "object_path": object_path,
                    "mime_type": req.mime_type,
                    "byte_size": byte_size,
                    "width": req.width,
                    "height": req.height,
                }),
            )
            .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                warn!("attachment row insert failed, removing uploaded object: {e}");
                if let Err(cleanup) = self
                    .backend
                    .remove_object(ATTACHMENT_BUCKET, &object_path)
                    .await
                {
                    warn!("orphaned object {ATTACHMENT_BUCKET}/{object_path}: {cleanup}");
                }
                return Err(backend_error("attaching the image", e));
            }
        };

        Ok(parse_row::<AttachmentRow>("attaching the image", row)?.into_attachment())
    }

    /// Removes the metadata row, then the stored object. Object removal is
    /// best effort: a failure there downgrades to a notice instead of an
    /// error, since the row — what the rest of the app sees — is gone.
    pub async fn delete(&self, attachment: &Attachment) -> DataResult<AttachmentDeletion> {
        self.backend
            .delete(
                "attachments",
                vec![Filter::Eq("id", attachment.id.as_str().into())],
            )
            .await
            .map_err(|e| backend_error("removing the attachment", e))?;

        match self
            .backend
            .remove_object(&attachment.bucket_id, &attachment.object_path)
            .await
        {
            Ok(()) => Ok(AttachmentDeletion {
                object_removed: true,
                notice: None,
            }),
            Err(e) => {
                warn!(
                    "object removal failed for {}/{}: {e}",
                    attachment.bucket_id, attachment.object_path
                );
                Ok(AttachmentDeletion {
                    object_removed: false,
                    notice: Some(DELETE_NOTICE),
                })
            }
        }
    }

    pub async fn list_for_comment(&self, comment_id: &str) -> DataResult<Vec<Attachment>> {
        let rows = self
            .backend
            .select(
                SelectQuery::table("attachments")
                    .eq("comment_id", comment_id)
                    .newest_first(),
            )
            .await
            .map_err(|e| backend_error("loading attachments", e))?;

        rows.into_iter()
            .map(|row| {
                parse_row::<AttachmentRow>("loading attachments", row)
                    .map(AttachmentRow::into_attachment)
            })
            .collect()
    }

    /// A temporary viewing URL for the stored object, via the shared cache.
    pub async fn signed_url(&self, attachment: &Attachment) -> DataResult<String> {
        self.urls
            .get_or_sign(
                self.backend.as_ref(),
                &attachment.bucket_id,
                &attachment.object_path,
                DEFAULT_TTL_SECS,
            )
            .await
    }

    /// Same as [`Self::signed_url`] with an explicit ttl.
    pub async fn signed_url_with_ttl(
        &self,
        attachment: &Attachment,
        ttl_secs: u32,
    ) -> DataResult<String> {
        self.urls
            .get_or_sign(
                self.backend.as_ref(),
                &attachment.bucket_id,
                &attachment.object_path,
                ttl_secs,
            )
            .await
    }
}

/// Picks the object-name extension from the MIME type, normalizing
/// `jpeg` to `jpg`, falling back to the original filename's extension.
fn extension_for(mime_type: &str, file_name: &str) -> String {
    if let Some(subtype) = mime_type.strip_prefix("image/") {
        let ext = if subtype == "jpeg" { "jpg" } else { subtype };
        return ext.to_string();
    }
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}
