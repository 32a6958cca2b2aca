use engine::{BotUserProfile, Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::Database;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn profile(telegram_id: i64, first_name: &str) -> BotUserProfile {
    BotUserProfile {
        telegram_id,
        first_name: Some(first_name.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn new_users_are_opted_in() {
    let engine = engine().await;
    let user = engine.upsert_bot_user(profile(1, "Ann")).await.unwrap();
    assert!(user.notifications_enabled);
    assert!(!user.blocked);
    assert!(user.is_broadcast_target());
}

#[tokio::test]
async fn targets_exclude_admin_opted_out_and_blocked() {
    let engine = engine().await;
    for id in 1..=5 {
        engine.upsert_bot_user(profile(id, "user")).await.unwrap();
    }
    engine.set_notifications(2, false).await.unwrap();
    engine.mark_blocked(3).await.unwrap();

    let targets = engine.broadcast_targets(Some(5)).await.unwrap();
    assert_eq!(targets, vec![1, 4]);

    let counts = engine.bot_user_counts(Some(5)).await.unwrap();
    assert_eq!(counts.total, 5);
    assert_eq!(counts.eligible, 2);
    assert_eq!(counts.blocked, 1);
    assert_eq!(counts.opted_out, 1);
}

#[tokio::test]
async fn returning_user_is_unblocked_but_keeps_preference() {
    let engine = engine().await;
    engine.upsert_bot_user(profile(9, "Bob")).await.unwrap();
    engine.set_notifications(9, false).await.unwrap();
    engine.mark_blocked(9).await.unwrap();

    let blocked = engine.bot_user(9).await.unwrap().unwrap();
    assert!(blocked.blocked);
    assert!(blocked.blocked_at.is_some());

    let back = engine.upsert_bot_user(profile(9, "Robert")).await.unwrap();
    assert!(!back.blocked);
    assert!(back.blocked_at.is_none());
    assert!(!back.notifications_enabled);
    assert_eq!(back.first_name.as_deref(), Some("Robert"));
}

#[tokio::test]
async fn unknown_users_cannot_be_updated() {
    let engine = engine().await;
    assert!(matches!(
        engine.mark_blocked(77).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.set_notifications(77, true).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
