use std::collections::HashMap;

use cowave_types::{
    Attachment, Comment, CommentPatch, DataError, Page, Reflection, Room, RoomPatch, Thread,
    WaveSummary,
};

/// Everything that can change the normalized store.
///
/// Page-lifecycle actions carry the request token issued by
/// [`crate::RequestTokens`]; the reducer drops any completion whose token is
/// older than the slot's latest, which is what protects a fast page-3
/// response from being overwritten by a slow page-2 one.
#[derive(Debug, Clone)]
pub enum Action {
    ThreadsLoading {
        room_id: String,
        token: u64,
    },
    ThreadsLoaded {
        room_id: String,
        token: u64,
        page: Page<Thread>,
        /// `true` for a fresh load or refresh, `false` for a pagination
        /// continuation appended after the existing ids.
        replace: bool,
    },
    ThreadsFailed {
        room_id: String,
        token: u64,
        error: DataError,
    },
    ThreadCreated {
        thread: Thread,
    },

    CommentsLoading {
        thread_id: String,
        token: u64,
    },
    CommentsLoaded {
        thread_id: String,
        token: u64,
        page: Page<Comment>,
        replace: bool,
    },
    CommentsFailed {
        thread_id: String,
        token: u64,
        error: DataError,
    },
    CommentCreated {
        comment: Comment,
    },
    CommentPatched {
        comment_id: String,
        patch: CommentPatch,
    },

    RoomsLoaded {
        rooms: Vec<Room>,
    },
    RoomCreated {
        room: Room,
    },
    RoomPatched {
        room_id: String,
        patch: RoomPatch,
    },

    AttachmentAdded {
        comment_id: String,
        attachment: Attachment,
    },
    AttachmentRemoved {
        comment_id: String,
        attachment_id: String,
    },

    WaveSummaryLoaded {
        by_comment: HashMap<String, WaveSummary>,
    },

    ReflectionUpserted {
        reflection: Reflection,
    },
}
