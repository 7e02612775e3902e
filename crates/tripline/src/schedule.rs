// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tripline schedule` command implementation.
//!
//! Runs one scheduler pass with the real SQLite storage and HTTP gateway.
//! Invoked periodically by an external trigger (cron, systemd timer); any
//! number of overlapping invocations stay safe because claiming happens in
//! the database, not in this process.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use tripline_config::TriplineConfig;
use tripline_core::{StorageAdapter, TriplineError};
use tripline_engine::Scheduler;
use tripline_messaging::HttpGateway;
use tripline_storage::SqliteStorage;

/// Run one scheduler pass and print its summary.
pub async fn run_schedule(config: TriplineConfig) -> Result<(), TriplineError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let gateway = Arc::new(HttpGateway::new(&config.gateway)?);

    let scheduler = Scheduler::new(
        storage.clone(),
        gateway,
        config.scheduler.batch_size,
        Duration::from_secs(config.scheduler.lock_timeout_secs),
    );

    let summary = scheduler.run_pass().await?;
    info!(
        examined = summary.examined,
        sent = summary.sent,
        failed = summary.failed,
        not_due = summary.not_due,
        lost_claim = summary.lost_claim,
        "scheduler pass complete"
    );
    println!(
        "examined {} | sent {} | failed {} | not due {} | lost claim {}",
        summary.examined, summary.sent, summary.failed, summary.not_due, summary.lost_claim
    );

    storage.close().await?;
    Ok(())
}
