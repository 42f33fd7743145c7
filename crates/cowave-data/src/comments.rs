use std::sync::Arc;

use cowave_backend::{Backend, Filter};
use cowave_types::api::NewComment;
use cowave_types::{Comment, CommentPatch, DataError, DataResult, Page, PageCursor};
use serde_json::json;

use crate::rows::CommentRow;
use crate::{backend_error, load_page, parse_row};

pub struct CommentRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> CommentRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// One page of a thread's comments, newest first. The reply forest is
    /// flattened here; tree assembly is the caller's concern.
    pub async fn list_page(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> DataResult<Page<Comment>> {
        load_page(
            self.backend.as_ref(),
            "comments",
            "thread_id",
            thread_id,
            limit,
            cursor,
            "loading comments",
            |row: CommentRow| Ok(row.into_comment()),
        )
        .await
    }

    pub async fn create(&self, user_id: &str, req: NewComment) -> DataResult<Comment> {
        let body = req.body.trim();
        if body.is_empty() {
            return Err(DataError::validation("Write something first."));
        }

        let row = self
            .backend
            .insert(
                "comments",
                json!({
                    "thread_id": req.thread_id,
                    "created_by": user_id,
                    "body": body,
                    "parent_comment_id": req.parent_comment_id,
                    "is_deleted": false,
                }),
            )
            .await
            .map_err(|e| backend_error("posting the comment", e))?;

        Ok(parse_row::<CommentRow>("posting the comment", row)?.into_comment())
    }

    /// Soft-deletes a comment. Attachments are cascade-removed server-side.
    /// Returns the patch to dispatch into the store.
    pub async fn mark_deleted(&self, comment_id: &str) -> DataResult<CommentPatch> {
        let updated = self
            .backend
            .update(
                "comments",
                vec![Filter::Eq("id", comment_id.into())],
                json!({ "is_deleted": true }),
            )
            .await
            .map_err(|e| backend_error("deleting the comment", e))?;

        if updated.is_empty() {
            return Err(DataError::unknown(
                "deleting the comment",
                "no matching comment",
            ));
        }

        Ok(CommentPatch {
            is_deleted: Some(true),
            ..CommentPatch::default()
        })
    }
}
