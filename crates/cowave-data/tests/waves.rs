mod common;

use common::{at_minute, backend, seed_comment, seed_room, seed_thread};
use cowave_backend::{Backend, SelectQuery};
use cowave_data::WaveRepo;
use cowave_local::SqliteBackend;
use cowave_types::WaveKind;
use std::sync::Arc;

async fn seed_board(backend: &SqliteBackend) {
    seed_room(backend, "r1").await;
    seed_thread(backend, "t1", "r1", at_minute(0)).await;
    seed_comment(backend, "c1", "t1", at_minute(1)).await;
    seed_comment(backend, "c2", "t1", at_minute(2)).await;
}

#[tokio::test]
async fn adding_the_same_wave_twice_is_a_silent_success() {
    let backend = backend();
    seed_board(&backend).await;

    let repo = WaveRepo::new(Arc::clone(&backend));
    let first = repo.add("c1", "u1", WaveKind::Support).await.unwrap();
    let second = repo.add("c1", "u1", WaveKind::Support).await.unwrap();
    assert_eq!(first.id, second.id);

    let rows = backend
        .select(SelectQuery::table("wave_reactions").eq("comment_id", "c1"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn kinds_coexist_on_the_same_comment() {
    let backend = backend();
    seed_board(&backend).await;

    let repo = WaveRepo::new(backend);
    repo.add("c1", "u1", WaveKind::Support).await.unwrap();
    repo.add("c1", "u1", WaveKind::Insight).await.unwrap();

    let summaries = repo
        .summarize(&["c1".into()], Some("u1"))
        .await
        .unwrap();
    let summary = &summaries["c1"];
    assert_eq!(summary.support, 1);
    assert_eq!(summary.insight, 1);
    assert_eq!(summary.question, 0);
    assert_eq!(summary.mine.len(), 2);
}

#[tokio::test]
async fn summarize_aggregates_per_comment_and_marks_the_viewer() {
    let backend = backend();
    seed_board(&backend).await;

    let repo = WaveRepo::new(backend);
    repo.add("c1", "u1", WaveKind::Support).await.unwrap();
    repo.add("c1", "u2", WaveKind::Support).await.unwrap();
    repo.add("c1", "u2", WaveKind::Question).await.unwrap();
    repo.add("c2", "u2", WaveKind::Insight).await.unwrap();

    let ids = vec!["c1".to_string(), "c2".to_string()];
    let summaries = repo.summarize(&ids, Some("u1")).await.unwrap();

    let c1 = &summaries["c1"];
    assert_eq!(c1.support, 2);
    assert_eq!(c1.question, 1);
    assert_eq!(c1.mine, [WaveKind::Support]);

    let c2 = &summaries["c2"];
    assert_eq!(c2.insight, 1);
    assert!(c2.mine.is_empty());
}

#[tokio::test]
async fn summarize_without_a_viewer_marks_nothing() {
    let backend = backend();
    seed_board(&backend).await;

    let repo = WaveRepo::new(backend);
    repo.add("c1", "u1", WaveKind::Support).await.unwrap();

    let summaries = repo.summarize(&["c1".into()], None).await.unwrap();
    assert!(summaries["c1"].mine.is_empty());
}

#[tokio::test]
async fn removed_waves_drop_out_of_the_summary() {
    let backend = backend();
    seed_board(&backend).await;

    let repo = WaveRepo::new(backend);
    repo.add("c1", "u1", WaveKind::Support).await.unwrap();
    repo.remove("c1", "u1", WaveKind::Support).await.unwrap();

    let summaries = repo.summarize(&["c1".into()], Some("u1")).await.unwrap();
    assert!(!summaries.contains_key("c1"));
}

#[tokio::test]
async fn summarize_with_no_ids_skips_the_backend() {
    let repo = WaveRepo::new(backend());
    let summaries = repo.summarize(&[], None).await.unwrap();
    assert!(summaries.is_empty());
}
