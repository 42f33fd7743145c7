//! Shared domain types for the CoWave data-sync core.
//! Canonical definitions live here so the store, the repositories and the
//! backend port all agree on entity shapes without depending on each other.

pub mod api;
pub mod error;
pub mod models;
pub mod page;
pub mod slug;

pub use error::{DataError, DataResult, ErrorKind};
pub use models::{
    Achievement, Attachment, Comment, CommentPatch, Reflection, Room, RoomPatch, RoomStatus,
    Thread, WaveKind, WaveReaction, WaveSummary,
};
pub use page::{Page, PageCursor};
