// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch delivery of scheduled messages.
//!
//! A pass scans delivery candidates, decides per job whether its local
//! `(date, time, timezone)` is due, atomically claims each due job, and
//! hands it to the messaging gateway. The claim is a conditional update
//! confirmed by the storage layer, so overlapping passes -- or independent
//! worker instances -- never both deliver one job. Jobs are independent; no
//! ordering holds across them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tracing::{debug, error, info, warn};
use tripline_core::types::{JobStatus, MessageContent, ScheduledMessage};
use tripline_core::{MessagingGateway, StorageAdapter, TriplineError};

use crate::fmt_iso;

/// Counters for one scheduler pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Delivery candidates examined.
    pub examined: usize,
    /// Jobs delivered and marked sent.
    pub sent: usize,
    /// Jobs whose gateway call failed (retained for retry or parked).
    pub failed: usize,
    /// Jobs whose due instant is still in the future.
    pub not_due: usize,
    /// Due jobs lost to a concurrent pass's claim.
    pub lost_claim: usize,
}

/// Periodically invoked batch scheduler.
pub struct Scheduler {
    storage: Arc<dyn StorageAdapter>,
    gateway: Arc<dyn MessagingGateway>,
    batch_size: i64,
    lock_timeout: Duration,
}

impl Scheduler {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        gateway: Arc<dyn MessagingGateway>,
        batch_size: i64,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            gateway,
            batch_size,
            lock_timeout,
        }
    }

    /// Run one pass at the current instant.
    pub async fn run_pass(&self) -> Result<PassSummary, TriplineError> {
        self.run_pass_at(Utc::now()).await
    }

    /// Run one pass as of `now`. Exposed for deterministic tests and for
    /// externally triggered runs.
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> Result<PassSummary, TriplineError> {
        let now_iso = fmt_iso(now);
        let jobs = self
            .storage
            .list_deliverable(&now_iso, self.batch_size)
            .await?;

        let mut summary = PassSummary {
            examined: jobs.len(),
            ..PassSummary::default()
        };

        for job in jobs {
            match due_instant(&job) {
                Ok(due) if due > now => {
                    summary.not_due += 1;
                    continue;
                }
                Ok(_) => {}
                Err(reason) => {
                    // An unresolvable schedule burns an attempt so the row
                    // eventually parks as failed instead of looping forever.
                    warn!(job_id = job.id, reason = reason.as_str(), "job schedule unresolvable");
                    self.record_failure(&job, &reason).await?;
                    summary.failed += 1;
                    continue;
                }
            }

            let locked_until = fmt_iso(now + TimeDelta::from_std(self.lock_timeout).unwrap_or_default());
            if !self
                .storage
                .claim_scheduled(job.id, &locked_until, &now_iso)
                .await?
            {
                debug!(job_id = job.id, "claim lost to a concurrent pass");
                summary.lost_claim += 1;
                continue;
            }

            match self.deliver(&job).await {
                Ok(delivery_id) => {
                    self.storage.mark_sent(job.id, &delivery_id).await?;
                    info!(job_id = job.id, recipient = job.recipient.as_str(), "job delivered");
                    summary.sent += 1;
                }
                Err(e) => {
                    self.record_failure(&job, &e.to_string()).await?;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// One gateway call for a claimed job. The claim guarantees this runs
    /// at most once per job per claimable window.
    async fn deliver(&self, job: &ScheduledMessage) -> Result<String, TriplineError> {
        let content = match (&job.template_id, &job.body) {
            (Some(template), _) => MessageContent::Template(template.clone()),
            (None, Some(body)) => MessageContent::Body(body.clone()),
            (None, None) => {
                return Err(TriplineError::Internal(format!(
                    "job {} has neither body nor template",
                    job.id
                )));
            }
        };
        let variables = job
            .variables
            .as_deref()
            .and_then(|v| serde_json::from_str(v).ok())
            .unwrap_or_else(|| json!({}));

        let delivery = self
            .gateway
            .send(&job.recipient, &content, &variables)
            .await?;
        Ok(delivery.0)
    }

    async fn record_failure(
        &self,
        job: &ScheduledMessage,
        reason: &str,
    ) -> Result<(), TriplineError> {
        let status = self.storage.mark_failed_attempt(job.id, reason).await?;
        if status == JobStatus::Failed {
            error!(
                job_id = job.id,
                recipient = job.recipient.as_str(),
                attempts = job.attempts + 1,
                reason,
                "delivery retries exhausted, job parked for operator review"
            );
        } else {
            warn!(job_id = job.id, reason, "delivery failed, job retained for retry");
        }
        Ok(())
    }
}

/// Interpret `(send_date, send_time)` in the job's named timezone.
///
/// A DST-ambiguous local time resolves to its earliest instant; a local
/// time that falls in a spring-forward gap is shifted past the gap.
fn due_instant(job: &ScheduledMessage) -> Result<DateTime<Utc>, String> {
    let timezone: Tz = job
        .timezone
        .parse()
        .map_err(|_| format!("unknown timezone `{}`", job.timezone))?;
    let date = NaiveDate::parse_from_str(&job.send_date, "%Y-%m-%d")
        .map_err(|_| format!("invalid send_date `{}`", job.send_date))?;
    let time = NaiveTime::parse_from_str(&job.send_time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&job.send_time, "%H:%M:%S"))
        .map_err(|_| format!("invalid send_time `{}`", job.send_time))?;
    let naive = date.and_time(time);

    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = naive + TimeDelta::hours(1);
            timezone
                .from_local_datetime(&shifted)
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
                .ok_or_else(|| format!("unrepresentable local time `{naive}`"))
        }
    }
}
