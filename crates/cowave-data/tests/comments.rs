mod common;

use common::{at_minute, backend, seed_comment, seed_room, seed_thread};
use cowave_data::CommentRepo;
use cowave_types::ErrorKind;
use cowave_types::api::NewComment;

#[tokio::test]
async fn comment_pages_walk_newest_first() {
    let backend = backend();
    seed_room(&backend, "r1").await;
    seed_thread(&backend, "t1", "r1", at_minute(0)).await;
    seed_comment(&backend, "c-old", "t1", at_minute(1)).await;
    seed_comment(&backend, "c-mid", "t1", at_minute(2)).await;
    seed_comment(&backend, "c-new", "t1", at_minute(3)).await;

    let repo = CommentRepo::new(backend);

    let first = repo.list_page("t1", Some(2), None).await.unwrap();
    let ids: Vec<&str> = first.items.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c-new", "c-mid"]);
    assert!(first.has_more);

    let second = repo
        .list_page("t1", Some(2), first.cursor)
        .await
        .unwrap();
    let ids: Vec<&str> = second.items.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c-old"]);
    assert!(!second.has_more);
}

#[tokio::test]
async fn listed_comments_carry_no_enrichment() {
    let backend = backend();
    seed_room(&backend, "r1").await;
    seed_thread(&backend, "t1", "r1", at_minute(0)).await;
    seed_comment(&backend, "c1", "t1", at_minute(1)).await;

    let page = CommentRepo::new(backend)
        .list_page("t1", None, None)
        .await
        .unwrap();
    assert!(page.items[0].attachments.is_none());
    assert!(page.items[0].waves.is_none());
}

#[tokio::test]
async fn comment_create_trims_and_keeps_the_parent_link() {
    let backend = backend();
    seed_room(&backend, "r1").await;
    seed_thread(&backend, "t1", "r1", at_minute(0)).await;
    seed_comment(&backend, "c-root", "t1", at_minute(1)).await;

    let repo = CommentRepo::new(backend);
    let reply = repo
        .create(
            "u1",
            NewComment {
                thread_id: "t1".into(),
                body: "  agreed  ".into(),
                parent_comment_id: Some("c-root".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reply.body, "agreed");
    assert_eq!(reply.parent_comment_id.as_deref(), Some("c-root"));
    assert!(!reply.is_deleted);
}

#[tokio::test]
async fn comment_create_rejects_blank_body() {
    let backend = backend();
    seed_room(&backend, "r1").await;
    seed_thread(&backend, "t1", "r1", at_minute(0)).await;

    let err = CommentRepo::new(backend)
        .create(
            "u1",
            NewComment {
                thread_id: "t1".into(),
                body: " \n ".into(),
                parent_comment_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn mark_deleted_persists_and_returns_the_patch() {
    let backend = backend();
    seed_room(&backend, "r1").await;
    seed_thread(&backend, "t1", "r1", at_minute(0)).await;
    seed_comment(&backend, "c1", "t1", at_minute(1)).await;

    let repo = CommentRepo::new(backend);
    let patch = repo.mark_deleted("c1").await.unwrap();
    assert_eq!(patch.is_deleted, Some(true));
    assert!(patch.body.is_none());

    let page = repo.list_page("t1", None, None).await.unwrap();
    assert!(page.items[0].is_deleted);
}

#[tokio::test]
async fn mark_deleted_on_a_missing_comment_is_an_error() {
    let backend = backend();
    let err = CommentRepo::new(backend)
        .mark_deleted("nope")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert!(err.message.contains("deleting the comment"));
}
