//! Poll loop: fetch → validate → parse → notify → advance cursor, then sleep.
//!
//! - The cursor only moves after a cycle finished without error.
//! - Every record of a batch is parsed before anything is sent, so a bad
//!   record fails the whole cycle and the batch is retried from the same cursor.
//! - A failure is reported to the chat only when its text differs from the
//!   last reported one; a successful cycle clears that marker.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    domain::Cursor,
    errors::Error,
    messaging::notifier::Notifier,
    ports::ReviewApi,
    review::{current_date, homeworks, parse_status, validate_response},
    Result,
};

pub const ERROR_PREFIX: &str = "Сбой в работе программы";

/// What a single cycle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Answer was valid and carried no homework updates.
    NoUpdates,
    /// Answer was valid; this many status messages were sent.
    Updated(usize),
    /// Cycle failed. `reported` is true when a send to the chat was attempted
    /// (delivery may still have failed), false when the same failure was
    /// already reported.
    Failed { message: String, reported: bool },
}

pub struct Poller {
    api: Arc<dyn ReviewApi>,
    notifier: Notifier,
    retry_period: Duration,
    cursor: Cursor,
    last_error: String,
}

impl Poller {
    pub fn new(cfg: &Config, api: Arc<dyn ReviewApi>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            retry_period: cfg.retry_period,
            cursor: Cursor::now(),
            last_error: String::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_retry_period(mut self, retry_period: Duration) -> Self {
        self.retry_period = retry_period;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Text of the last failure sent to the chat; empty after a clean cycle.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Run until `cancel` fires. Sleeps `retry_period` after every cycle.
    pub async fn run(&mut self, cancel: &CancellationToken) {
        tracing::info!(
            cursor = self.cursor.0,
            retry_period_secs = self.retry_period.as_secs(),
            "poll loop started"
        );
        loop {
            self.run_cycle().await;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.retry_period) => {}
            }
        }
        tracing::info!(cursor = self.cursor.0, "poll loop stopped");
    }

    /// Run exactly `cycles` cycles with the usual pause between them.
    pub async fn run_cycles(&mut self, cycles: usize) -> Vec<CycleOutcome> {
        let mut out = Vec::with_capacity(cycles);
        for i in 0..cycles {
            if i > 0 {
                sleep(self.retry_period).await;
            }
            out.push(self.run_cycle().await);
        }
        out
    }

    /// One unit of work.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.check_updates().await {
            Ok(sent) => {
                self.last_error.clear();
                if sent == 0 {
                    CycleOutcome::NoUpdates
                } else {
                    CycleOutcome::Updated(sent)
                }
            }
            Err(e) => self.report_failure(e).await,
        }
    }

    async fn check_updates(&mut self) -> Result<usize> {
        let response = self.api.fetch(self.cursor).await?;
        validate_response(&response)?;
        let next_cursor = current_date(&response)?;

        let records = homeworks(&response);
        if records.is_empty() {
            tracing::debug!(cursor = self.cursor.0, "no new homework statuses");
        }

        let messages = records
            .iter()
            .map(parse_status)
            .collect::<Result<Vec<_>>>()?;

        for message in &messages {
            self.notifier.notify(message).await;
        }

        tracing::debug!(from = self.cursor.0, to = next_cursor.0, "cursor advanced");
        self.cursor = next_cursor;
        Ok(messages.len())
    }

    async fn report_failure(&mut self, err: Error) -> CycleOutcome {
        let message = format!("{ERROR_PREFIX}: {err}");
        tracing::error!("{message}");

        let reported = message != self.last_error;
        if reported {
            self.notifier.notify(&message).await;
        } else {
            tracing::debug!("same failure already reported, not notifying");
        }
        self.last_error = message.clone();

        CycleOutcome::Failed { message, reported }
    }
}
