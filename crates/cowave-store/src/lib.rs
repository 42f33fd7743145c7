//! Normalized client-side cache for CoWave.
//!
//! Entities live in per-type maps keyed by id; "which ids belong to this
//! room/thread" lives in per-parent [`Slot`]s alongside pagination state.
//! [`reduce`] is the only way state changes: deterministic, synchronous,
//! no I/O, and total over [`Action`] — there is no failing path. Repositories
//! fetch, callers dispatch, the reducer merges.

pub mod action;
mod merge;
mod slot;
pub mod tokens;

use std::collections::HashMap;

use cowave_types::{Comment, Reflection, Room, Thread};

pub use action::Action;
pub use slot::Slot;
pub use tokens::RequestTokens;

#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub rooms: HashMap<String, Room>,
    pub threads: HashMap<String, Thread>,
    pub comments: HashMap<String, Comment>,
    pub reflections: HashMap<String, Reflection>,
    /// room id → thread listing state.
    pub threads_by_room: HashMap<String, Slot>,
    /// thread id → comment listing state.
    pub comments_by_thread: HashMap<String, Slot>,
}

impl AppData {
    pub fn thread_slot(&self, room_id: &str) -> Option<&Slot> {
        self.threads_by_room.get(room_id)
    }

    pub fn comment_slot(&self, thread_id: &str) -> Option<&Slot> {
        self.comments_by_thread.get(thread_id)
    }
}

fn upsert_room(rooms: &mut HashMap<String, Room>, incoming: Room) {
    match rooms.get_mut(&incoming.id) {
        Some(existing) => merge::merge_room(existing, incoming),
        None => {
            rooms.insert(incoming.id.clone(), incoming);
        }
    }
}

fn upsert_thread(threads: &mut HashMap<String, Thread>, incoming: Thread) {
    match threads.get_mut(&incoming.id) {
        Some(existing) => merge::merge_thread(existing, incoming),
        None => {
            threads.insert(incoming.id.clone(), incoming);
        }
    }
}

fn upsert_comment(comments: &mut HashMap<String, Comment>, incoming: Comment) {
    match comments.get_mut(&incoming.id) {
        Some(existing) => merge::merge_comment(existing, incoming),
        None => {
            comments.insert(incoming.id.clone(), incoming);
        }
    }
}

pub fn reduce(state: &mut AppData, action: Action) {
    match action {
        Action::ThreadsLoading { room_id, token } => {
            state.threads_by_room.entry(room_id).or_default().begin(token);
        }
        Action::ThreadsLoaded {
            room_id,
            token,
            page,
            replace,
        } => {
            let slot = state.threads_by_room.entry(room_id).or_default();
            if !slot.accepts(token) {
                return;
            }
            slot.latest_token = token;
            let ids: Vec<String> = page.items.iter().map(|t| t.id.clone()).collect();
            slot.finish(ids, page.cursor, page.has_more, replace);
            for thread in page.items {
                upsert_thread(&mut state.threads, thread);
            }
        }
        Action::ThreadsFailed {
            room_id,
            token,
            error,
        } => {
            let slot = state.threads_by_room.entry(room_id).or_default();
            if !slot.accepts(token) {
                return;
            }
            slot.fail(error);
        }
        Action::ThreadCreated { thread } => {
            state
                .threads_by_room
                .entry(thread.room_id.clone())
                .or_default()
                .prepend(&thread.id);
            upsert_thread(&mut state.threads, thread);
        }

        Action::CommentsLoading { thread_id, token } => {
            state
                .comments_by_thread
                .entry(thread_id)
                .or_default()
                .begin(token);
        }
        Action::CommentsLoaded {
            thread_id,
            token,
            page,
            replace,
        } => {
            let slot = state.comments_by_thread.entry(thread_id).or_default();
            if !slot.accepts(token) {
                return;
            }
            slot.latest_token = token;
            let ids: Vec<String> = page.items.iter().map(|c| c.id.clone()).collect();
            slot.finish(ids, page.cursor, page.has_more, replace);
            for comment in page.items {
                upsert_comment(&mut state.comments, comment);
            }
        }
        Action::CommentsFailed {
            thread_id,
            token,
            error,
        } => {
            let slot = state.comments_by_thread.entry(thread_id).or_default();
            if !slot.accepts(token) {
                return;
            }
            slot.fail(error);
        }
        Action::CommentCreated { comment } => {
            state
                .comments_by_thread
                .entry(comment.thread_id.clone())
                .or_default()
                .prepend(&comment.id);
            upsert_comment(&mut state.comments, comment);
        }
        Action::CommentPatched { comment_id, patch } => {
            // A patch for an id we have never seen is dropped: typed records
            // cannot be materialized from partial data.
            if let Some(comment) = state.comments.get_mut(&comment_id) {
                merge::apply_comment_patch(comment, patch);
            }
        }

        Action::RoomsLoaded { rooms } => {
            for room in rooms {
                upsert_room(&mut state.rooms, room);
            }
        }
        Action::RoomCreated { room } => {
            upsert_room(&mut state.rooms, room);
        }
        Action::RoomPatched { room_id, patch } => {
            if let Some(room) = state.rooms.get_mut(&room_id) {
                merge::apply_room_patch(room, patch);
            }
        }

        Action::AttachmentAdded {
            comment_id,
            attachment,
        } => {
            let Some(comment) = state.comments.get_mut(&comment_id) else {
                return;
            };
            if comment.is_deleted {
                return;
            }
            let attachments = comment.attachments.get_or_insert_with(Vec::new);
            attachments.retain(|a| a.id != attachment.id);
            attachments.insert(0, attachment);
        }
        Action::AttachmentRemoved {
            comment_id,
            attachment_id,
        } => {
            let Some(comment) = state.comments.get_mut(&comment_id) else {
                return;
            };
            if comment.is_deleted {
                return;
            }
            if let Some(attachments) = comment.attachments.as_mut() {
                attachments.retain(|a| a.id != attachment_id);
            }
        }

        Action::WaveSummaryLoaded { by_comment } => {
            for (comment_id, summary) in by_comment {
                if let Some(comment) = state.comments.get_mut(&comment_id) {
                    comment.waves = Some(summary);
                }
            }
        }

        Action::ReflectionUpserted { reflection } => {
            match state.reflections.get_mut(&reflection.id) {
                Some(existing) => merge::merge_reflection(existing, reflection),
                None => {
                    state.reflections.insert(reflection.id.clone(), reflection);
                }
            }
        }
    }
}
