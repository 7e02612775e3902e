// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled-message job operations.
//!
//! The job table is the coordination point for independent scheduler
//! workers: claiming is a conditional update that only succeeds while the
//! row is still claimable, so two overlapping passes can never both carry
//! the same job to the gateway.

use rusqlite::params;
use tripline_core::types::JobStatus;
use tripline_core::TriplineError;

use crate::database::Database;
use crate::models::{ScheduledMessage, ScheduledMessageDraft};

const JOB_COLUMNS: &str = "id, trip_id, recipient, body, template_id, variables, send_date, \
                           send_time, timezone, message_type, status, attempts, max_attempts, \
                           locked_until, last_error, delivery_id, sent_at, created_at, updated_at";

fn row_to_job(row: &rusqlite::Row<'_>) -> Result<ScheduledMessage, rusqlite::Error> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        recipient: row.get(2)?,
        body: row.get(3)?,
        template_id: row.get(4)?,
        variables: row.get(5)?,
        send_date: row.get(6)?,
        send_time: row.get(7)?,
        timezone: row.get(8)?,
        message_type: row.get(9)?,
        status: row.get(10)?,
        attempts: row.get(11)?,
        max_attempts: row.get(12)?,
        locked_until: row.get(13)?,
        last_error: row.get(14)?,
        delivery_id: row.get(15)?,
        sent_at: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

/// Enqueue a job unconditionally. Returns the new job ID.
pub async fn enqueue(db: &Database, draft: &ScheduledMessageDraft) -> Result<i64, TriplineError> {
    let draft = draft.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO scheduled_messages
                     (trip_id, recipient, body, template_id, variables,
                      send_date, send_time, timezone, message_type, max_attempts)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    draft.trip_id,
                    draft.recipient,
                    draft.body,
                    draft.template_id,
                    draft.variables,
                    draft.send_date,
                    draft.send_time,
                    draft.timezone,
                    draft.message_type,
                    draft.max_attempts,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Enqueue a job only if no job of the same type exists for the
/// `(trip_id, recipient)` pair, whether sent or unsent.
///
/// The guard and the insert are one statement, so duplicate fan-out
/// invocations racing on the same participant cannot both insert. Returns
/// `None` when the job was deduplicated.
pub async fn enqueue_unique(
    db: &Database,
    draft: &ScheduledMessageDraft,
) -> Result<Option<i64>, TriplineError> {
    let draft = draft.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO scheduled_messages
                     (trip_id, recipient, body, template_id, variables,
                      send_date, send_time, timezone, message_type, max_attempts)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
                 WHERE NOT EXISTS (
                     SELECT 1 FROM scheduled_messages
                     WHERE trip_id = ?1 AND recipient = ?2 AND message_type = ?9
                 )",
                params![
                    draft.trip_id,
                    draft.recipient,
                    draft.body,
                    draft.template_id,
                    draft.variables,
                    draft.send_date,
                    draft.send_time,
                    draft.timezone,
                    draft.message_type,
                    draft.max_attempts,
                ],
            )?;
            if inserted == 1 {
                Ok(Some(conn.last_insert_rowid()))
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a job by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<ScheduledMessage>, TriplineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOB_COLUMNS} FROM scheduled_messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_job);
            match result {
                Ok(job) => Ok(Some(job)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List delivery candidates: pending jobs, plus sending jobs whose claim
/// lock expired before `now` (a pass that crashed mid-delivery).
pub async fn list_deliverable(
    db: &Database,
    now: &str,
    limit: i64,
) -> Result<Vec<ScheduledMessage>, TriplineError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOB_COLUMNS} FROM scheduled_messages
                 WHERE status = 'pending'
                    OR (status = 'sending' AND locked_until IS NOT NULL AND locked_until < ?1)
                 ORDER BY id ASC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![now, limit], row_to_job)?;
            let mut jobs = Vec::new();
            for row in rows {
                jobs.push(row?);
            }
            Ok(jobs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically claim a job for delivery.
///
/// The conditional update succeeds only while the row is still claimable
/// (pending, or sending with an expired lock). Exactly one of any number of
/// overlapping passes observes `true` per claimable window.
pub async fn claim(
    db: &Database,
    id: i64,
    locked_until: &str,
    now: &str,
) -> Result<bool, TriplineError> {
    let locked_until = locked_until.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE scheduled_messages
                 SET status = 'sending', locked_until = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2
                   AND (status = 'pending'
                        OR (status = 'sending' AND locked_until IS NOT NULL
                            AND locked_until < ?3))",
                params![locked_until, id, now],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Finalize a successful delivery: `sending -> sent`, exactly once.
pub async fn mark_sent(db: &Database, id: i64, delivery_id: &str) -> Result<(), TriplineError> {
    let delivery_id = delivery_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE scheduled_messages
                 SET status = 'sent', delivery_id = ?1, locked_until = NULL,
                     last_error = NULL,
                     sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND status = 'sending'",
                params![delivery_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a failed delivery attempt.
///
/// Increments attempts. Below the cap the job returns to `pending` for a
/// later pass; at the cap it parks in `failed` for operator attention.
/// Returns the resulting status.
pub async fn mark_failed_attempt(
    db: &Database,
    id: i64,
    error: &str,
) -> Result<JobStatus, TriplineError> {
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (i64, i64) = conn.query_row(
                "SELECT attempts, max_attempts FROM scheduled_messages WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            let status = if new_attempts >= max_attempts {
                JobStatus::Failed
            } else {
                JobStatus::Pending
            };
            conn.execute(
                "UPDATE scheduled_messages
                 SET status = ?1, attempts = ?2, locked_until = NULL, last_error = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![status.to_string(), new_attempts, error, id],
            )?;
            Ok(status)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Operator deletion of a job.
pub async fn delete(db: &Database, id: i64) -> Result<(), TriplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM scheduled_messages WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
