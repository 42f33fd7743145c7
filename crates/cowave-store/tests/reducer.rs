use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use cowave_store::{Action, AppData, RequestTokens, reduce};
use cowave_types::{
    Attachment, Comment, CommentPatch, DataError, Page, PageCursor, Thread, WaveKind, WaveSummary,
};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, minute, 0).unwrap()
}

fn thread(id: &str, minute: u32) -> Thread {
    Thread {
        id: id.to_string(),
        room_id: "room-1".to_string(),
        created_by: "user-1".to_string(),
        title: format!("thread {id}"),
        body: "body".to_string(),
        created_at: at(minute),
    }
}

fn comment(id: &str, minute: u32) -> Comment {
    Comment {
        id: id.to_string(),
        thread_id: "thread-1".to_string(),
        created_by: "user-1".to_string(),
        body: format!("comment {id}"),
        parent_comment_id: None,
        created_at: at(minute),
        is_deleted: false,
        attachments: None,
        waves: None,
    }
}

fn attachment(id: &str) -> Attachment {
    Attachment {
        id: id.to_string(),
        comment_id: "c1".to_string(),
        user_id: "user-1".to_string(),
        bucket_id: "attachments".to_string(),
        object_path: format!("user-1/c1/{id}.png"),
        mime_type: "image/png".to_string(),
        byte_size: 1024,
        width: Some(64),
        height: Some(64),
        created_at: at(0),
    }
}

fn page(items: Vec<Thread>, has_more: bool) -> Page<Thread> {
    let cursor = if has_more {
        items.last().map(|t| PageCursor::new(t.created_at, t.id.clone()))
    } else {
        None
    };
    Page {
        items,
        cursor,
        has_more,
    }
}

#[test]
fn loading_sets_flag_and_clears_error() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::ThreadsFailed {
            room_id: "room-1".into(),
            token: 1,
            error: DataError::offline(),
        },
    );
    reduce(
        &mut state,
        Action::ThreadsLoading {
            room_id: "room-1".into(),
            token: 2,
        },
    );

    let slot = state.thread_slot("room-1").unwrap();
    assert!(slot.loading);
    assert!(slot.error.is_none());
}

#[test]
fn replace_load_resets_ids_to_response_order() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 1,
            page: page(vec![thread("t1", 30), thread("t2", 20)], true),
            replace: true,
        },
    );
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 2,
            page: page(vec![thread("t9", 50), thread("t1", 30)], false),
            replace: true,
        },
    );

    let slot = state.thread_slot("room-1").unwrap();
    assert_eq!(slot.ids, ["t9", "t1"]);
    assert!(!slot.has_more);
    assert!(slot.cursor.is_none());
    assert!(!slot.loading);
}

#[test]
fn append_load_is_idempotent() {
    let mut state = AppData::default();
    let load = Action::ThreadsLoaded {
        room_id: "room-1".into(),
        token: 1,
        page: page(vec![thread("t1", 30), thread("t2", 20)], true),
        replace: false,
    };
    reduce(&mut state, load.clone());
    let once = state.thread_slot("room-1").unwrap().ids.clone();
    reduce(&mut state, load);
    let twice = state.thread_slot("room-1").unwrap().ids.clone();

    assert_eq!(once, twice);
    assert_eq!(twice, ["t1", "t2"]);
}

#[test]
fn append_load_preserves_first_occurrence_order() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 1,
            page: page(vec![thread("t1", 30), thread("t2", 20)], true),
            replace: true,
        },
    );
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 2,
            page: page(vec![thread("t2", 20), thread("t3", 10)], false),
            replace: false,
        },
    );

    let slot = state.thread_slot("room-1").unwrap();
    assert_eq!(slot.ids, ["t1", "t2", "t3"]);
}

#[test]
fn created_thread_goes_first_and_moves_not_duplicates() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 1,
            page: page(vec![thread("a", 30), thread("b", 20), thread("c", 10)], false),
            replace: true,
        },
    );

    reduce(&mut state, Action::ThreadCreated { thread: thread("d", 40) });
    assert_eq!(state.thread_slot("room-1").unwrap().ids, ["d", "a", "b", "c"]);

    reduce(&mut state, Action::ThreadCreated { thread: thread("b", 20) });
    assert_eq!(state.thread_slot("room-1").unwrap().ids, ["b", "d", "a", "c"]);
}

#[test]
fn stale_response_is_dropped() {
    let mut state = AppData::default();
    let tokens = RequestTokens::new();
    let first = tokens.next();
    let second = tokens.next();

    reduce(
        &mut state,
        Action::ThreadsLoading {
            room_id: "room-1".into(),
            token: first,
        },
    );
    reduce(
        &mut state,
        Action::ThreadsLoading {
            room_id: "room-1".into(),
            token: second,
        },
    );
    // The newer request completes first...
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: second,
            page: page(vec![thread("fresh", 50)], false),
            replace: true,
        },
    );
    // ...then the slow old one arrives and must be ignored.
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: first,
            page: page(vec![thread("stale", 10)], true),
            replace: true,
        },
    );

    let slot = state.thread_slot("room-1").unwrap();
    assert_eq!(slot.ids, ["fresh"]);
    assert!(!slot.has_more);
}

#[test]
fn stale_error_is_dropped_too() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::ThreadsLoaded {
            room_id: "room-1".into(),
            token: 5,
            page: page(vec![thread("t1", 30)], false),
            replace: true,
        },
    );
    reduce(
        &mut state,
        Action::ThreadsFailed {
            room_id: "room-1".into(),
            token: 3,
            error: DataError::offline(),
        },
    );

    assert!(state.thread_slot("room-1").unwrap().error.is_none());
}

#[test]
fn failed_load_records_error_and_stops_loading() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::CommentsLoading {
            thread_id: "thread-1".into(),
            token: 1,
        },
    );
    reduce(
        &mut state,
        Action::CommentsFailed {
            thread_id: "thread-1".into(),
            token: 1,
            error: DataError::offline(),
        },
    );

    let slot = state.comment_slot("thread-1").unwrap();
    assert!(!slot.loading);
    assert_eq!(slot.error.as_ref().unwrap(), &DataError::offline());
}

#[test]
fn list_reload_keeps_enrichment_fields() {
    let mut state = AppData::default();
    let mut enriched = comment("c1", 30);
    enriched.attachments = Some(vec![attachment("a1")]);
    enriched.waves = Some(WaveSummary {
        support: 2,
        ..WaveSummary::default()
    });
    reduce(&mut state, Action::CommentCreated { comment: enriched });

    // A later list load projects neither attachments nor waves.
    reduce(
        &mut state,
        Action::CommentsLoaded {
            thread_id: "thread-1".into(),
            token: 1,
            page: Page {
                items: vec![comment("c1", 30)],
                cursor: None,
                has_more: false,
            },
            replace: true,
        },
    );

    let cached = &state.comments["c1"];
    assert_eq!(cached.attachments.as_ref().unwrap().len(), 1);
    assert_eq!(cached.waves.as_ref().unwrap().support, 2);
}

#[test]
fn patch_is_shallow_and_non_destructive() {
    let mut state = AppData::default();
    let mut existing = comment("c1", 30);
    existing.waves = Some(WaveSummary {
        insight: 1,
        ..WaveSummary::default()
    });
    reduce(&mut state, Action::CommentCreated { comment: existing });

    reduce(
        &mut state,
        Action::CommentPatched {
            comment_id: "c1".into(),
            patch: CommentPatch {
                body: Some("edited".into()),
                ..CommentPatch::default()
            },
        },
    );

    let cached = &state.comments["c1"];
    assert_eq!(cached.body, "edited");
    assert_eq!(cached.waves.as_ref().unwrap().insight, 1);
}

#[test]
fn patch_for_unknown_comment_is_a_noop() {
    let mut state = AppData::default();
    reduce(
        &mut state,
        Action::CommentPatched {
            comment_id: "ghost".into(),
            patch: CommentPatch {
                body: Some("boo".into()),
                ..CommentPatch::default()
            },
        },
    );
    assert!(state.comments.is_empty());
}

#[test]
fn attachment_add_prepends_and_dedups() {
    let mut state = AppData::default();
    reduce(&mut state, Action::CommentCreated { comment: comment("c1", 30) });

    reduce(
        &mut state,
        Action::AttachmentAdded {
            comment_id: "c1".into(),
            attachment: attachment("a1"),
        },
    );
    reduce(
        &mut state,
        Action::AttachmentAdded {
            comment_id: "c1".into(),
            attachment: attachment("a2"),
        },
    );
    reduce(
        &mut state,
        Action::AttachmentAdded {
            comment_id: "c1".into(),
            attachment: attachment("a1"),
        },
    );

    let ids: Vec<&str> = state.comments["c1"]
        .attachments
        .as_ref()
        .unwrap()
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, ["a1", "a2"]);
}

#[test]
fn attachment_ops_skip_deleted_comments() {
    let mut state = AppData::default();
    let mut deleted = comment("c1", 30);
    deleted.is_deleted = true;
    reduce(&mut state, Action::CommentCreated { comment: deleted });

    reduce(
        &mut state,
        Action::AttachmentAdded {
            comment_id: "c1".into(),
            attachment: attachment("a1"),
        },
    );
    assert!(state.comments["c1"].attachments.is_none());
}

#[test]
fn attachment_remove_filters_by_id() {
    let mut state = AppData::default();
    let mut with_files = comment("c1", 30);
    with_files.attachments = Some(vec![attachment("a1"), attachment("a2")]);
    reduce(&mut state, Action::CommentCreated { comment: with_files });

    reduce(
        &mut state,
        Action::AttachmentRemoved {
            comment_id: "c1".into(),
            attachment_id: "a1".into(),
        },
    );

    let ids: Vec<&str> = state.comments["c1"]
        .attachments
        .as_ref()
        .unwrap()
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, ["a2"]);
}

#[test]
fn wave_summaries_attach_to_known_comments_only() {
    let mut state = AppData::default();
    reduce(&mut state, Action::CommentCreated { comment: comment("c1", 30) });

    let mut by_comment = HashMap::new();
    by_comment.insert(
        "c1".to_string(),
        WaveSummary {
            support: 3,
            question: 1,
            mine: vec![WaveKind::Support],
            ..WaveSummary::default()
        },
    );
    by_comment.insert("unknown".to_string(), WaveSummary::default());

    reduce(&mut state, Action::WaveSummaryLoaded { by_comment });

    let waves = state.comments["c1"].waves.as_ref().unwrap();
    assert_eq!(waves.support, 3);
    assert_eq!(waves.mine, vec![WaveKind::Support]);
    assert!(!state.comments.contains_key("unknown"));
}
