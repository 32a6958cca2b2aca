use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use engine::{BotUserProfile, Engine};
use migration::MigratorTrait;
use sea_orm::Database;
use tokio::time::Instant;
use telegram_bot::{
    BroadcastReport, BroadcastSettings, Broadcaster, DeliveryError, Messenger, ProgressSink,
};

const ADMIN: i64 = 1;

fn instant_settings(batch_size: usize) -> BroadcastSettings {
    BroadcastSettings {
        batch_size,
        batch_delay: Duration::ZERO,
        retry_delay: Duration::ZERO,
    }
}

async fn engine_with_users(ids: &[i64]) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    for &telegram_id in ids {
        engine
            .upsert_bot_user(BotUserProfile {
                telegram_id,
                first_name: Some(format!("user{telegram_id}")),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    engine
}

/// Answers per chat with a scripted sequence of results, then `Ok`.
#[derive(Default)]
struct ScriptedMessenger {
    scripts: Mutex<HashMap<i64, Vec<Result<(), DeliveryError>>>>,
    attempts: Mutex<HashMap<i64, usize>>,
    delivered: Mutex<Vec<(i64, String)>>,
}

impl ScriptedMessenger {
    fn script(self, chat_id: i64, results: Vec<Result<(), DeliveryError>>) -> Self {
        self.scripts.lock().unwrap().insert(chat_id, results);
        self
    }

    fn attempts(&self, chat_id: i64) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(&chat_id)
            .copied()
            .unwrap_or(0)
    }

    fn delivered_to(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap().entry(chat_id).or_default() += 1;
        let next = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&chat_id) {
                Some(script) if !script.is_empty() => script.remove(0),
                _ => Ok(()),
            }
        };
        if next.is_ok() {
            self.delivered
                .lock()
                .unwrap()
                .push((chat_id, text.to_string()));
        }
        next
    }
}

/// Always succeeds, yielding mid-send so concurrent sends overlap.
#[derive(Default)]
struct TimingMessenger {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started_at: Mutex<Vec<Instant>>,
}

#[async_trait]
impl Messenger for TimingMessenger {
    async fn deliver(&self, _chat_id: i64, _text: &str) -> Result<(), DeliveryError> {
        self.started_at.lock().unwrap().push(Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    no_targets: Mutex<bool>,
    started: Mutex<Option<usize>>,
    progress: Mutex<Vec<BroadcastReport>>,
    finished: Mutex<Option<BroadcastReport>>,
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn no_targets(&self) {
        *self.no_targets.lock().unwrap() = true;
    }

    async fn started(&self, total: usize) {
        *self.started.lock().unwrap() = Some(total);
    }

    async fn progress(&self, report: &BroadcastReport) {
        self.progress.lock().unwrap().push(*report);
    }

    async fn finished(&self, report: &BroadcastReport) {
        *self.finished.lock().unwrap() = Some(*report);
    }
}

#[tokio::test]
async fn rate_limited_and_blocked_targets_are_counted() {
    let engine = engine_with_users(&[ADMIN, 10, 11, 12, 13, 14]).await;
    let messenger = ScriptedMessenger::default()
        .script(
            11,
            vec![
                Err(DeliveryError::RateLimited),
                Err(DeliveryError::RateLimited),
            ],
        )
        .script(12, vec![Err(DeliveryError::Blocked)]);
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", Some(ADMIN))
        .await
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.sent, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.blocked, 1);
    assert_eq!(report.success_rate(), 60);

    // one retry after a rate limit, none after a block
    assert_eq!(messenger.attempts(11), 2);
    assert_eq!(messenger.attempts(12), 1);
    assert_eq!(messenger.attempts(ADMIN), 0);

    let blocked = engine.bot_user(12).await.unwrap().unwrap();
    assert!(blocked.blocked);
    assert!(blocked.blocked_at.is_some());
    assert_eq!(*sink.finished.lock().unwrap(), Some(report));
}

#[tokio::test]
async fn single_rate_limit_succeeds_on_retry() {
    let engine = engine_with_users(&[10, 11]).await;
    let messenger =
        ScriptedMessenger::default().script(10, vec![Err(DeliveryError::RateLimited)]);
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(messenger.attempts(10), 2);
}

#[tokio::test]
async fn other_errors_are_not_retried() {
    let engine = engine_with_users(&[10]).await;
    let messenger = ScriptedMessenger::default()
        .script(10, vec![Err(DeliveryError::Other("chat not found".to_string()))]);
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(messenger.attempts(10), 1);
    assert!(!engine.bot_user(10).await.unwrap().unwrap().blocked);
}

#[tokio::test]
async fn rate_limit_then_block_counts_as_blocked() {
    let engine = engine_with_users(&[10, 11]).await;
    let messenger = ScriptedMessenger::default().script(
        10,
        vec![Err(DeliveryError::RateLimited), Err(DeliveryError::Blocked)],
    );
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.blocked, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(messenger.attempts(10), 2);
    assert!(engine.bot_user(10).await.unwrap().unwrap().blocked);
}

#[tokio::test]
async fn sends_within_a_batch_run_concurrently() {
    let ids: Vec<i64> = (100..107).collect();
    let engine = engine_with_users(&ids).await;
    let messenger = TimingMessenger::default();
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(3))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.sent, 7);
    // a whole batch in flight at once, never two batches
    assert_eq!(messenger.peak.load(Ordering::SeqCst), 3);
    assert_eq!(messenger.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batches_are_spaced_without_trailing_delay() {
    const DELAY: Duration = Duration::from_millis(150);
    let ids: Vec<i64> = (100..105).collect();
    let engine = engine_with_users(&ids).await;
    let messenger = TimingMessenger::default();
    let sink = RecordingSink::default();
    let settings = BroadcastSettings {
        batch_size: 2,
        batch_delay: DELAY,
        retry_delay: Duration::ZERO,
    };

    let start = Instant::now();
    Broadcaster::new(&engine, &messenger, &sink, settings)
        .run("hello", None)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    let started_at = messenger.started_at.lock().unwrap().clone();
    assert_eq!(started_at.len(), 5);
    // batches [0, 1], [2, 3], [4]
    let gaps: Vec<Duration> = started_at.windows(2).map(|w| w[1] - w[0]).collect();
    let pauses = gaps.iter().filter(|gap| **gap >= DELAY).count();
    assert_eq!(pauses, 2);
    assert!(gaps[0] < DELAY && gaps[2] < DELAY);

    // two pauses, not three
    assert!(elapsed >= DELAY * 2);
    assert!(elapsed < DELAY * 3, "took {elapsed:?}");
}

#[tokio::test]
async fn progress_is_reported_after_each_batch() {
    let ids: Vec<i64> = (100..105).collect();
    let engine = engine_with_users(&ids).await;
    let messenger = ScriptedMessenger::default();
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(2))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.sent, 5);
    assert_eq!(*sink.started.lock().unwrap(), Some(5));
    let processed: Vec<usize> = sink
        .progress
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.processed)
        .collect();
    assert_eq!(processed, vec![2, 4, 5]);
    assert_eq!(messenger.delivered_to(), ids);
}

#[tokio::test]
async fn opted_out_and_blocked_users_are_skipped() {
    let engine = engine_with_users(&[10, 11, 12]).await;
    engine.set_notifications(11, false).await.unwrap();
    engine.mark_blocked(12).await.unwrap();
    let messenger = ScriptedMessenger::default();
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", None)
        .await
        .unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(messenger.delivered_to(), vec![10]);
}

#[tokio::test]
async fn no_targets_short_circuits() {
    let engine = engine_with_users(&[ADMIN]).await;
    let messenger = ScriptedMessenger::default();
    let sink = RecordingSink::default();

    let report = Broadcaster::new(&engine, &messenger, &sink, instant_settings(20))
        .run("hello", Some(ADMIN))
        .await
        .unwrap();

    assert_eq!(report, BroadcastReport::default());
    assert!(*sink.no_targets.lock().unwrap());
    assert!(sink.started.lock().unwrap().is_none());
    assert!(sink.finished.lock().unwrap().is_none());
}

#[tokio::test]
async fn returning_user_is_unblocked() {
    let engine = engine_with_users(&[10]).await;
    engine.mark_blocked(10).await.unwrap();
    engine
        .upsert_bot_user(BotUserProfile {
            telegram_id: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    let targets = engine.broadcast_targets(None).await.unwrap();
    assert_eq!(targets, vec![10]);
}
