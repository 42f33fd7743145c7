#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use cowave_backend::Backend;
use cowave_local::{SqliteBackend, timestamp};
use serde_json::json;

pub fn backend() -> Arc<SqliteBackend> {
    Arc::new(SqliteBackend::open_in_memory().unwrap())
}

/// A fixed instant offset by whole minutes, for deterministic ordering.
pub fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 10, minute, 0).unwrap()
}

/// Seeded rooms carry no creator so the proposal-quota trigger stays out of
/// the way of tests that are not about it.
pub async fn seed_room(backend: &SqliteBackend, id: &str) {
    backend
        .insert(
            "rooms",
            json!({
                "id": id,
                "slug": format!("room-{id}"),
                "name": format!("Room {id}"),
                "description": "",
                "is_public": true,
                "status": "approved",
                "created_by": null,
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_thread(backend: &SqliteBackend, id: &str, room_id: &str, at: DateTime<Utc>) {
    backend
        .insert(
            "threads",
            json!({
                "id": id,
                "room_id": room_id,
                "created_by": "seed",
                "title": format!("Thread {id}"),
                "body": "seeded",
                "created_at": timestamp(at),
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_comment(backend: &SqliteBackend, id: &str, thread_id: &str, at: DateTime<Utc>) {
    backend
        .insert(
            "comments",
            json!({
                "id": id,
                "thread_id": thread_id,
                "created_by": "seed",
                "body": format!("comment {id}"),
                "parent_comment_id": null,
                "is_deleted": false,
                "created_at": timestamp(at),
            }),
        )
        .await
        .unwrap();
}
