use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resume point for reverse-chronological pagination.
///
/// Ordering is strictly decreasing `(created_at, id)`; the id is the
/// tie-break that keeps paging stable when several rows share a timestamp.
/// Ids are opaque strings and are never assumed numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl PageCursor {
    pub fn new(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }
}

/// One page of a parent-scoped listing.
///
/// `cursor` points at the last item actually returned and is `None` exactly
/// when `has_more` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<PageCursor>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
