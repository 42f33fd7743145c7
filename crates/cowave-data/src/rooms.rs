use std::sync::Arc;

use cowave_backend::{Backend, SelectQuery};
use cowave_types::api::ProposeRoom;
use cowave_types::{DataError, DataResult, ErrorKind, Room, slug};
use serde_json::json;
use tracing::debug;

use crate::rows::RoomRow;
use crate::{backend_error, parse_row};

const MAX_NAME_LEN: usize = 80;

/// Human-readable mapping for the backend's room-proposal policy
/// (at most 3 proposals per user, at most one per 24 hours).
const QUOTA_MESSAGE: &str =
    "You've reached the room proposal limit: up to 3 rooms, at most one per day.";

pub struct RoomRepo<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> RoomRepo<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Approved, publicly visible rooms, newest first.
    pub async fn list_approved(&self) -> DataResult<Vec<Room>> {
        let rows = self
            .backend
            .select(
                SelectQuery::table("rooms")
                    .eq("status", "approved")
                    .eq("is_public", true)
                    .newest_first(),
            )
            .await
            .map_err(|e| backend_error("loading rooms", e))?;

        rows.into_iter()
            .map(|row| parse_row::<RoomRow>("loading rooms", row).map(RoomRow::into_room))
            .collect()
    }

    /// Rooms this user proposed, in any moderation state.
    pub async fn list_mine(&self, user_id: &str) -> DataResult<Vec<Room>> {
        let rows = self
            .backend
            .select(
                SelectQuery::table("rooms")
                    .eq("created_by", user_id)
                    .newest_first(),
            )
            .await
            .map_err(|e| backend_error("loading your rooms", e))?;

        rows.into_iter()
            .map(|row| parse_row::<RoomRow>("loading your rooms", row).map(RoomRow::into_room))
            .collect()
    }

    pub async fn get_by_slug(&self, slug: &str) -> DataResult<Option<Room>> {
        let mut rows = self
            .backend
            .select(SelectQuery::table("rooms").eq("slug", slug).limit(1))
            .await
            .map_err(|e| backend_error("loading the room", e))?;

        match rows.pop() {
            Some(row) => Ok(Some(
                parse_row::<RoomRow>("loading the room", row)?.into_room(),
            )),
            None => Ok(None),
        }
    }

    /// Proposes a new room. The room is created with status `pending`;
    /// moderation happens elsewhere.
    pub async fn propose(&self, user_id: &str, req: ProposeRoom) -> DataResult<Room> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(DataError::validation("Give your room a name."));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DataError::validation(format!(
                "Room names can be up to {MAX_NAME_LEN} characters."
            )));
        }
        let Some(room_slug) = slug::normalize(name) else {
            return Err(DataError::validation(
                "That name doesn't work as a web address. Try one with letters or numbers.",
            ));
        };

        debug!(slug = %room_slug, "proposing room");
        let row = self
            .backend
            .insert(
                "rooms",
                json!({
                    "slug": room_slug,
                    "name": name,
                    "description": req.description.trim(),
                    "is_public": req.is_public,
                    "status": "pending",
                    "created_by": user_id,
                }),
            )
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Conflict => {
                    DataError::conflict("A room with a similar name already exists.")
                }
                ErrorKind::Quota => DataError::quota(QUOTA_MESSAGE),
                _ => backend_error("proposing the room", e),
            })?;

        Ok(parse_row::<RoomRow>("proposing the room", row)?.into_room())
    }
}
