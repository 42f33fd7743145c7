//! Typed request payloads the repositories accept from UI collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeRoom {
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThread {
    pub room_id: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub thread_id: String,
    pub body: String,
    /// Must reference a comment in the same thread; enforced server-side.
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReflection {
    pub for_date: NaiveDate,
    pub body: String,
    pub is_public: bool,
}

/// An attachment upload. Bytes are held in memory; the 5 MiB cap keeps that
/// reasonable.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub user_id: String,
    pub comment_id: String,
    pub file_name: String,
    pub mime_type: String,
    /// Pixel dimensions when the caller has decoded the image.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Vec<u8>,
}
