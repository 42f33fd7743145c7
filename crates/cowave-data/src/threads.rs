use std::sync::Arc;

use cowave_backend::Backend;
use cowave_types::api::NewThread;
use cowave_types::{DataError, DataResult, Page, PageCursor, Thread};
use serde_json::json;

use crate::rows::ThreadRow;
use crate::{backend_error, load_page, parse_row};

pub struct ThreadRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> ThreadRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// One page of a room's threads, newest first. Pass the previous page's
    /// cursor to continue.
    pub async fn list_page(
        &self,
        room_id: &str,
        limit: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> DataResult<Page<Thread>> {
        load_page(
            self.backend.as_ref(),
            "threads",
            "room_id",
            room_id,
            limit,
            cursor,
            "loading threads",
            |row: ThreadRow| Ok(row.into_thread()),
        )
        .await
    }

    pub async fn create(&self, user_id: &str, req: NewThread) -> DataResult<Thread> {
        let title = req.title.trim();
        let body = req.body.trim();
        if title.is_empty() {
            return Err(DataError::validation("Give your thread a title."));
        }
        if body.is_empty() {
            return Err(DataError::validation("Write something in the thread body."));
        }

        let row = self
            .backend
            .insert(
                "threads",
                json!({
                    "room_id": req.room_id,
                    "created_by": user_id,
                    "title": title,
                    "body": body,
                }),
            )
            .await
            .map_err(|e| backend_error("creating the thread", e))?;

        Ok(parse_row::<ThreadRow>("creating the thread", row)?.into_thread())
    }
}
