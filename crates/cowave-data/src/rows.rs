//! Wire row types and their domain mappings.
//!
//! Rows are validated at deserialization: a row missing a required column
//! fails here, once, instead of being defensively re-checked at every call
//! site. Distinct from the domain types so backend column quirks stay out of
//! the rest of the client.

use chrono::{DateTime, NaiveDate, Utc};
use cowave_types::{
    Achievement, Attachment, Comment, PageCursor, Reflection, Room, RoomStatus, Thread,
    WaveKind, WaveReaction,
};
use serde::{Deserialize, Deserializer};

use crate::PageItem;

/// SQLite represents booleans as 0/1 integers while the HTTP dialect sends
/// real JSON booleans; accept both.
fn loose_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }
    Ok(match BoolOrInt::deserialize(de)? {
        BoolOrInt::Bool(b) => b,
        BoolOrInt::Int(n) => n != 0,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomRow {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "loose_bool")]
    pub is_public: bool,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoomRow {
    pub fn into_room(self) -> Room {
        Room {
            id: self.id,
            slug: self.slug,
            name: self.name,
            description: self.description,
            is_public: self.is_public,
            created_at: self.created_at,
            created_by: self.created_by,
            status: RoomStatus::parse(&self.status),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadRow {
    pub id: String,
    pub room_id: String,
    pub created_by: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ThreadRow {
    pub fn into_thread(self) -> Thread {
        Thread {
            id: self.id,
            room_id: self.room_id,
            created_by: self.created_by,
            title: self.title,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRow {
    pub id: String,
    pub thread_id: String,
    pub created_by: String,
    pub body: String,
    pub parent_comment_id: Option<String>,
    #[serde(default, deserialize_with = "loose_bool")]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            thread_id: self.thread_id,
            created_by: self.created_by,
            body: self.body,
            parent_comment_id: self.parent_comment_id,
            created_at: self.created_at,
            is_deleted: self.is_deleted,
            attachments: None,
            waves: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttachmentRow {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    pub bucket_id: String,
    pub object_path: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl AttachmentRow {
    pub fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            comment_id: self.comment_id,
            user_id: self.user_id,
            bucket_id: self.bucket_id,
            object_path: self.object_path,
            mime_type: self.mime_type,
            byte_size: self.byte_size,
            width: self.width,
            height: self.height,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaveRow {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    pub kind: WaveKind,
    pub created_at: DateTime<Utc>,
}

impl WaveRow {
    pub fn into_reaction(self) -> WaveReaction {
        WaveReaction {
            id: self.id,
            comment_id: self.comment_id,
            user_id: self.user_id,
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReflectionRow {
    pub id: String,
    pub user_id: String,
    pub for_date: NaiveDate,
    pub body: String,
    #[serde(deserialize_with = "loose_bool")]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReflectionRow {
    pub fn into_reflection(self) -> Reflection {
        Reflection {
            id: self.id,
            user_id: self.user_id,
            for_date: self.for_date,
            body: self.body,
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AchievementRow {
    pub id: String,
    pub user_id: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

impl AchievementRow {
    pub fn into_achievement(self) -> Achievement {
        Achievement {
            id: self.id,
            user_id: self.user_id,
            key: self.key,
            unlocked_at: self.created_at,
        }
    }
}

impl PageItem for Thread {
    fn page_cursor(&self) -> PageCursor {
        PageCursor::new(self.created_at, self.id.clone())
    }
}

impl PageItem for Comment {
    fn page_cursor(&self) -> PageCursor {
        PageCursor::new(self.created_at, self.id.clone())
    }
}

impl PageItem for Reflection {
    fn page_cursor(&self) -> PageCursor {
        PageCursor::new(self.created_at, self.id.clone())
    }
}
