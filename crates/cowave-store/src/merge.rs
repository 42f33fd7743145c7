//! Entity merge rules.
//!
//! Merging an incoming entity is a shallow merge, never a replace: list
//! endpoints project fewer columns than detail reads, so enrichment fields
//! (`attachments`, `waves`, a known `created_by`) already in the cache must
//! survive a narrower incoming payload.

use cowave_types::{Comment, CommentPatch, Reflection, Room, RoomPatch, Thread};

pub(crate) fn merge_room(existing: &mut Room, incoming: Room) {
    let Room {
        id,
        slug,
        name,
        description,
        is_public,
        created_at,
        created_by,
        status,
    } = incoming;
    existing.id = id;
    existing.slug = slug;
    existing.name = name;
    existing.description = description;
    existing.is_public = is_public;
    existing.created_at = created_at;
    existing.created_by = created_by.or(existing.created_by.take());
    existing.status = status;
}

pub(crate) fn merge_thread(existing: &mut Thread, incoming: Thread) {
    *existing = incoming;
}

pub(crate) fn merge_comment(existing: &mut Comment, incoming: Comment) {
    let Comment {
        id,
        thread_id,
        created_by,
        body,
        parent_comment_id,
        created_at,
        is_deleted,
        attachments,
        waves,
    } = incoming;
    existing.id = id;
    existing.thread_id = thread_id;
    existing.created_by = created_by;
    existing.body = body;
    existing.parent_comment_id = parent_comment_id;
    existing.created_at = created_at;
    existing.is_deleted = is_deleted;
    existing.attachments = attachments.or(existing.attachments.take());
    existing.waves = waves.or(existing.waves.take());
}

pub(crate) fn merge_reflection(existing: &mut Reflection, incoming: Reflection) {
    *existing = incoming;
}

pub(crate) fn apply_comment_patch(comment: &mut Comment, patch: CommentPatch) {
    if let Some(body) = patch.body {
        comment.body = body;
    }
    if let Some(is_deleted) = patch.is_deleted {
        comment.is_deleted = is_deleted;
    }
    if let Some(attachments) = patch.attachments {
        comment.attachments = Some(attachments);
    }
    if let Some(waves) = patch.waves {
        comment.waves = Some(waves);
    }
}

pub(crate) fn apply_room_patch(room: &mut Room, patch: RoomPatch) {
    if let Some(name) = patch.name {
        room.name = name;
    }
    if let Some(description) = patch.description {
        room.description = description;
    }
    if let Some(is_public) = patch.is_public {
        room.is_public = is_public;
    }
    if let Some(status) = patch.status {
        room.status = status;
    }
}
