mod common;

use common::backend;
use cowave_data::AchievementRepo;

#[tokio::test]
async fn unlocking_twice_returns_the_same_achievement() {
    let repo = AchievementRepo::new(backend());

    let first = repo.unlock("u1", "first-thread").await.unwrap();
    let second = repo.unlock("u1", "first-thread").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.unlocked_at, second.unlocked_at);

    let all = repo.list_for_user("u1").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].key, "first-thread");
}

#[tokio::test]
async fn distinct_keys_and_users_unlock_independently() {
    let repo = AchievementRepo::new(backend());

    repo.unlock("u1", "first-thread").await.unwrap();
    repo.unlock("u1", "first-wave").await.unwrap();
    repo.unlock("u2", "first-thread").await.unwrap();

    assert_eq!(repo.list_for_user("u1").await.unwrap().len(), 2);
    assert_eq!(repo.list_for_user("u2").await.unwrap().len(), 1);
}
