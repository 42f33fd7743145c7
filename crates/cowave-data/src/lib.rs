//! Entity repositories: translate typed intents into backend queries and
//! backend rows into domain shapes, normalizing every failure mode into a
//! [`DataError`] the UI can show as-is. No repository mutates local cache
//! state — callers dispatch results into `cowave-store` themselves.

pub mod achievements;
pub mod attachments;
pub mod comments;
pub mod reflections;
pub mod rooms;
mod rows;
pub mod threads;
pub mod urlcache;
pub mod waves;

pub use achievements::AchievementRepo;
pub use attachments::{AttachmentDeletion, AttachmentRepo, MAX_ATTACHMENT_BYTES};
pub use comments::CommentRepo;
pub use reflections::ReflectionRepo;
pub use rooms::RoomRepo;
pub use threads::ThreadRepo;
pub use urlcache::SignedUrlCache;
pub use waves::WaveRepo;

use cowave_backend::{Backend, BackendError, Row, SelectQuery};
use cowave_types::{DataError, DataResult, ErrorKind, Page, PageCursor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maps a backend failure onto a displayable [`DataError`]. `doing` is a
/// gerund phrase ("loading threads") used in the fallback message.
pub(crate) fn backend_error(doing: &str, err: BackendError) -> DataError {
    match err.kind() {
        ErrorKind::Offline => DataError::offline(),
        ErrorKind::Permission => {
            DataError::permission("You don't have permission to do that.")
        }
        ErrorKind::Conflict => {
            DataError::conflict("That change clashes with something that already exists.")
        }
        ErrorKind::Quota => DataError::quota("You've hit a usage limit. Please try again later."),
        ErrorKind::Validation | ErrorKind::Unknown => DataError::unknown(doing, err),
    }
}

pub(crate) fn parse_row<R: DeserializeOwned>(doing: &str, row: Row) -> DataResult<R> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        warn!("malformed row while {doing}: {e}");
        DataError::unknown(doing, e)
    })
}

/// Items that can act as a pagination boundary.
pub(crate) trait PageItem {
    fn page_cursor(&self) -> PageCursor;
}

/// Shared page loader for all parent-scoped listings.
///
/// Coerces `limit` to at least 1 (default [`DEFAULT_PAGE_SIZE`]), requests
/// `limit + 1` rows to detect a further page without a count query, trims the
/// sentinel row, and derives the cursor from the last item actually returned.
pub(crate) async fn load_page<B, R, T, F>(
    backend: &B,
    table: &'static str,
    parent_col: &'static str,
    parent_id: &str,
    limit: Option<u32>,
    cursor: Option<PageCursor>,
    doing: &'static str,
    map: F,
) -> DataResult<Page<T>>
where
    B: Backend,
    R: DeserializeOwned,
    T: PageItem,
    F: Fn(R) -> DataResult<T>,
{
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let mut query = SelectQuery::table(table)
        .eq(parent_col, parent_id)
        .newest_first()
        .limit(limit + 1);
    if let Some(cursor) = cursor {
        query = query.before(cursor);
    }

    let rows = backend
        .select(query)
        .await
        .map_err(|e| backend_error(doing, e))?;

    let has_more = rows.len() as u32 > limit;
    let mut items = Vec::with_capacity(rows.len().min(limit as usize));
    for row in rows.into_iter().take(limit as usize) {
        let parsed: R = parse_row(doing, row)?;
        items.push(map(parsed)?);
    }

    let cursor = if has_more {
        items.last().map(PageItem::page_cursor)
    } else {
        None
    };

    Ok(Page {
        items,
        cursor,
        has_more,
    })
}
