use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a room proposal. Transitions happen server-side;
/// the client only ever writes `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Pending,
    Approved,
    Rejected,
    /// Fallback for status values this client version does not know.
    Unknown,
}

impl RoomStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => RoomStatus::Pending,
            "approved" => RoomStatus::Approved,
            "rejected" => RoomStatus::Rejected,
            _ => RoomStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Pending => "pending",
            RoomStatus::Approved => "approved",
            RoomStatus::Rejected => "rejected",
            RoomStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub status: RoomStatus,
}

/// A top-level discussion inside a room. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub room_id: String,
    pub created_by: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A comment in a thread. `parent_comment_id` forms a reply forest; roots
/// have no parent. `attachments` and `waves` are enrichment fields: list
/// endpoints may omit them, detail reads fill them in, and the store's merge
/// rules keep previously known values alive when an incoming row lacks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub thread_id: String,
    pub created_by: String,
    pub body: String,
    pub parent_comment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub waves: Option<WaveSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
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

/// The three reaction flavors a user can leave on a comment. A user holds at
/// most one of each kind per comment; kinds coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveKind {
    Support,
    Insight,
    Question,
}

impl WaveKind {
    pub const ALL: [WaveKind; 3] = [WaveKind::Support, WaveKind::Insight, WaveKind::Question];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaveKind::Support => "support",
            WaveKind::Insight => "insight",
            WaveKind::Question => "question",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveReaction {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    pub kind: WaveKind,
    pub created_at: DateTime<Utc>,
}

/// Per-comment aggregate derived from individual reactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSummary {
    pub support: u32,
    pub insight: u32,
    pub question: u32,
    /// Kinds the viewing user has placed on this comment.
    pub mine: Vec<WaveKind>,
}

impl WaveSummary {
    pub fn count(&self, kind: WaveKind) -> u32 {
        match kind {
            WaveKind::Support => self.support,
            WaveKind::Insight => self.insight,
            WaveKind::Question => self.question,
        }
    }

    pub fn bump(&mut self, kind: WaveKind) {
        match kind {
            WaveKind::Support => self.support += 1,
            WaveKind::Insight => self.insight += 1,
            WaveKind::Question => self.question += 1,
        }
    }
}

/// A personal daily reflection. At most one per user per calendar date;
/// writing again for the same date replaces the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: String,
    pub user_id: String,
    pub for_date: NaiveDate,
    pub body: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub key: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Partial update for a cached comment. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPatch {
    pub body: Option<String>,
    pub is_deleted: Option<bool>,
    pub attachments: Option<Vec<Attachment>>,
    pub waves: Option<WaveSummary>,
}

/// Partial update for a cached room. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub status: Option<RoomStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_status_parse_falls_back_to_unknown() {
        assert_eq!(RoomStatus::parse("approved"), RoomStatus::Approved);
        assert_eq!(RoomStatus::parse("archived"), RoomStatus::Unknown);
    }

    #[test]
    fn wave_kind_serializes_lowercase() {
        let s = serde_json::to_string(&WaveKind::Insight).unwrap();
        assert_eq!(s, "\"insight\"");
    }

    #[test]
    fn wave_summary_counts_by_kind() {
        let mut summary = WaveSummary::default();
        summary.bump(WaveKind::Support);
        summary.bump(WaveKind::Support);
        summary.bump(WaveKind::Question);
        assert_eq!(summary.count(WaveKind::Support), 2);
        assert_eq!(summary.count(WaveKind::Insight), 0);
        assert_eq!(summary.count(WaveKind::Question), 1);
    }
}
