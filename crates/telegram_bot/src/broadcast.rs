//! Admin broadcast fan-out.
//!
//! Targets are processed in fixed-size batches: sends inside a batch run
//! concurrently, batches run one after the other with a pause in between.
//! A rate-limited send is retried once after `retry_delay`; a recipient who
//! blocked the bot is marked in the database and never retried.

use std::time::Duration;

use async_trait::async_trait;
use engine::{Engine, EngineError};
use futures::future::join_all;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub retry_delay: Duration,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            batch_delay: Duration::from_millis(1500),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Why a single delivery failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("rate limited")]
    RateLimited,
    /// The recipient blocked the bot or deleted the account.
    #[error("recipient blocked the bot")]
    Blocked,
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Delivers one message to one chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;
}

/// Receives the running totals of a broadcast.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn no_targets(&self);
    async fn started(&self, total: usize);
    /// Called after every batch.
    async fn progress(&self, report: &BroadcastReport);
    async fn finished(&self, report: &BroadcastReport);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub total: usize,
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub blocked: usize,
}

impl BroadcastReport {
    fn percent(part: usize, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        let percent = (part as f64 * 100.0 / total as f64).round();
        percent as u32
    }

    /// `round(sent * 100 / total)`
    pub fn success_rate(&self) -> u32 {
        Self::percent(self.sent, self.total)
    }

    pub fn progress_percent(&self) -> u32 {
        Self::percent(self.processed, self.total)
    }

    fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Sent => self.sent += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Blocked => self.blocked += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sent,
    Failed,
    Blocked,
}

pub struct Broadcaster<'a, M, P> {
    engine: &'a Engine,
    messenger: &'a M,
    sink: &'a P,
    settings: BroadcastSettings,
}

impl<'a, M, P> Broadcaster<'a, M, P>
where
    M: Messenger,
    P: ProgressSink,
{
    pub fn new(
        engine: &'a Engine,
        messenger: &'a M,
        sink: &'a P,
        settings: BroadcastSettings,
    ) -> Self {
        Self {
            engine,
            messenger,
            sink,
            settings,
        }
    }

    /// Sends `text` to every eligible user except `exclude`.
    ///
    /// Only loading the targets can fail; individual delivery failures are
    /// counted in the report.
    pub async fn run(&self, text: &str, exclude: Option<i64>) -> Result<BroadcastReport, EngineError> {
        let targets = self.engine.broadcast_targets(exclude).await?;
        let mut report = BroadcastReport {
            total: targets.len(),
            ..Default::default()
        };
        if targets.is_empty() {
            self.sink.no_targets().await;
            return Ok(report);
        }

        tracing::info!(targets = targets.len(), "broadcast started");
        self.sink.started(targets.len()).await;

        let batch_size = self.settings.batch_size.max(1);
        let batches = targets.chunks(batch_size).count();
        for (index, batch) in targets.chunks(batch_size).enumerate() {
            let outcomes = join_all(batch.iter().map(|&chat_id| self.deliver(chat_id, text))).await;
            for outcome in outcomes {
                report.record(outcome);
            }
            self.sink.progress(&report).await;

            if index + 1 < batches {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            blocked = report.blocked,
            "broadcast finished"
        );
        self.sink.finished(&report).await;
        Ok(report)
    }

    async fn deliver(&self, chat_id: i64, text: &str) -> Outcome {
        let first = self.messenger.deliver(chat_id, text).await;
        let result = match first {
            Err(DeliveryError::RateLimited) => {
                tracing::debug!(chat_id, "rate limited, retrying once");
                tokio::time::sleep(self.settings.retry_delay).await;
                self.messenger.deliver(chat_id, text).await
            }
            other => other,
        };

        match result {
            Ok(()) => Outcome::Sent,
            Err(DeliveryError::Blocked) => {
                if let Err(err) = self.engine.mark_blocked(chat_id).await {
                    tracing::error!(chat_id, "failed to mark user as blocked: {err}");
                }
                Outcome::Blocked
            }
            Err(err) => {
                tracing::warn!(chat_id, "broadcast delivery failed: {err}");
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_rounds() {
        let report = BroadcastReport {
            total: 3,
            processed: 3,
            sent: 2,
            failed: 1,
            blocked: 0,
        };
        assert_eq!(report.success_rate(), 67);
        assert_eq!(BroadcastReport::default().success_rate(), 0);
    }

    #[test]
    fn progress_counts_processed_targets() {
        let report = BroadcastReport {
            total: 40,
            processed: 20,
            sent: 18,
            failed: 1,
            blocked: 1,
        };
        assert_eq!(report.progress_percent(), 50);
    }
}
