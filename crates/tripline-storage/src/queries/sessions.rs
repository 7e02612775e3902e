// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session and intake operations.
//!
//! A session and its intake row are created as one transaction, keyed on the
//! `(trip_id, channel_address)` uniqueness constraint. Racing first contacts
//! both land on the same row; the loser's candidate token is discarded.

use rusqlite::params;
use tripline_core::traits::{IntakeTransition, SessionUpsert};
use tripline_core::TriplineError;

use crate::database::Database;
use crate::models::{Intake, Session};

/// Conflict-safe session upsert for `(trip_id, channel_address)`.
///
/// Inserts the session with `candidate_token` and a zeroed intake row when
/// the pair is unseen, otherwise returns the existing token. The
/// `INSERT OR IGNORE` on intakes also repairs a session that somehow lost
/// its paired intake row, so lookups never observe the pair half-created.
pub async fn upsert_session(
    db: &Database,
    trip_id: &str,
    channel_address: &str,
    candidate_token: &str,
) -> Result<SessionUpsert, TriplineError> {
    let trip_id = trip_id.to_string();
    let channel_address = channel_address.to_string();
    let candidate_token = candidate_token.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let inserted = tx.execute(
                "INSERT INTO sessions (token, trip_id, channel_address)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (trip_id, channel_address) DO NOTHING",
                params![candidate_token, trip_id, channel_address],
            )?;

            let token: String = tx.query_row(
                "SELECT token FROM sessions WHERE trip_id = ?1 AND channel_address = ?2",
                params![trip_id, channel_address],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT OR IGNORE INTO intakes (session_token) VALUES (?1)",
                params![token],
            )?;

            tx.commit()?;
            Ok(SessionUpsert {
                token,
                created: inserted == 1,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by its token.
pub async fn get_session(db: &Database, token: &str) -> Result<Option<Session>, TriplineError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT token, trip_id, channel_address, last_activity_at, created_at
                 FROM sessions WHERE token = ?1",
            )?;
            let result = stmt.query_row(params![token], |row| {
                Ok(Session {
                    token: row.get(0)?,
                    trip_id: row.get(1)?,
                    channel_address: row.get(2)?,
                    last_activity_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            });
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump a session's `last_activity_at` timestamp.
pub async fn touch_session(db: &Database, token: &str) -> Result<(), TriplineError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET last_activity_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE token = ?1",
                params![token],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the intake row for a session.
pub async fn get_intake(
    db: &Database,
    session_token: &str,
) -> Result<Option<Intake>, TriplineError> {
    let session_token = session_token.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_token, traveler_count, profile, completed_at, created_at
                 FROM intakes WHERE session_token = ?1",
            )?;
            let result = stmt.query_row(params![session_token], |row| {
                Ok(Intake {
                    session_token: row.get(0)?,
                    traveler_count: row.get(1)?,
                    profile: row.get(2)?,
                    completed_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            });
            match result {
                Ok(intake) => Ok(Some(intake)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Conditional AWAITING -> ACTIVE transition for a session's intake.
///
/// The `WHERE completed_at IS NULL` guard makes the transition itself the
/// idempotency key: of any number of submissions (including caller retries),
/// exactly one observes [`IntakeTransition::Completed`]. A lost race leaves
/// the stored profile untouched.
pub async fn complete_intake(
    db: &Database,
    session_token: &str,
    traveler_count: i64,
    profile: &str,
) -> Result<IntakeTransition, TriplineError> {
    let session_token = session_token.to_string();
    let profile = profile.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE intakes
                 SET traveler_count = ?1, profile = ?2,
                     completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE session_token = ?3 AND completed_at IS NULL",
                params![traveler_count, profile, session_token],
            )?;
            if changed == 1 {
                return Ok(IntakeTransition::Completed);
            }
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM intakes WHERE session_token = ?1)",
                params![session_token],
                |row| row.get(0),
            )?;
            if exists {
                Ok(IntakeTransition::AlreadyCompleted)
            } else {
                Ok(IntakeTransition::NotFound)
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trip;
    use crate::queries::trips::create_trip;
    use tempfile::tempdir;

    async fn setup_db_with_trip() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let trip = Trip {
            id: "trip-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            name: "Alps 2026".to_string(),
            share_token: "share-1".to_string(),
            profile_template: None,
            behavior_notes: None,
            itinerary_ref: None,
            timezone: "Europe/Amsterdam".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        create_trip(&db, &trip).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn first_contact_creates_session_and_intake() {
        let (db, _dir) = setup_db_with_trip().await;

        let up = upsert_session(&db, "trip-1", "+31612345678", "tok-a")
            .await
            .unwrap();
        assert!(up.created);
        assert_eq!(up.token, "tok-a");

        let session = get_session(&db, "tok-a").await.unwrap().unwrap();
        assert_eq!(session.channel_address, "+31612345678");

        // The intake row rides in the same transaction, zeroed and AWAITING.
        let intake = get_intake(&db, "tok-a").await.unwrap().unwrap();
        assert_eq!(intake.traveler_count, 0);
        assert!(intake.completed_at.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_contact_returns_existing_token() {
        let (db, _dir) = setup_db_with_trip().await;

        let first = upsert_session(&db, "trip-1", "+31612345678", "tok-a")
            .await
            .unwrap();
        let second = upsert_session(&db, "trip-1", "+31612345678", "tok-b")
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.token, "tok-a");

        // The losing candidate token never became a session.
        assert!(get_session(&db, "tok-b").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_upserts_converge_on_one_session() {
        let (db, _dir) = setup_db_with_trip().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let conn = db.connection().clone();
            handles.push(tokio::spawn(async move {
                let candidate = format!("cand-{i}");
                conn.call(move |conn| -> rusqlite::Result<String> {
                    let tx = conn.transaction()?;
                    tx.execute(
                        "INSERT INTO sessions (token, trip_id, channel_address)
                         VALUES (?1, 'trip-1', '+31612345678')
                         ON CONFLICT (trip_id, channel_address) DO NOTHING",
                        params![candidate],
                    )?;
                    let token: String = tx.query_row(
                        "SELECT token FROM sessions
                         WHERE trip_id = 'trip-1' AND channel_address = '+31612345678'",
                        [],
                        |row| row.get(0),
                    )?;
                    tx.execute(
                        "INSERT OR IGNORE INTO intakes (session_token) VALUES (?1)",
                        params![token],
                    )?;
                    tx.commit()?;
                    Ok(token)
                })
                .await
            }));
        }

        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap());
        }

        // Every racer received the same winning token.
        tokens.dedup();
        assert_eq!(tokens.len(), 1);

        let count: i64 = db
            .connection()
            .call(|conn| -> rusqlite::Result<i64> {
                let n = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn distinct_addresses_get_distinct_sessions() {
        let (db, _dir) = setup_db_with_trip().await;

        let a = upsert_session(&db, "trip-1", "+31611111111", "tok-a")
            .await
            .unwrap();
        let b = upsert_session(&db, "trip-1", "web:share-1", "tok-b")
            .await
            .unwrap();

        assert!(a.created);
        assert!(b.created);
        assert_ne!(a.token, b.token);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_repairs_missing_intake() {
        let (db, _dir) = setup_db_with_trip().await;

        // Simulate the partial-failure orphan: a session without its intake.
        db.connection()
            .call(|conn| -> rusqlite::Result<()> {
                conn.execute(
                    "INSERT INTO sessions (token, trip_id, channel_address)
                     VALUES ('orphan', 'trip-1', '+31699999999')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        assert!(get_intake(&db, "orphan").await.unwrap().is_none());

        let up = upsert_session(&db, "trip-1", "+31699999999", "ignored")
            .await
            .unwrap();
        assert!(!up.created);
        assert_eq!(up.token, "orphan");
        assert!(get_intake(&db, "orphan").await.unwrap().is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn complete_intake_transitions_exactly_once() {
        let (db, _dir) = setup_db_with_trip().await;
        upsert_session(&db, "trip-1", "+31612345678", "tok-a")
            .await
            .unwrap();

        let first = complete_intake(&db, "tok-a", 3, r#"{"names":["a","b","c"]}"#)
            .await
            .unwrap();
        assert_eq!(first, IntakeTransition::Completed);

        // A retry is benign and must not clobber the stored profile.
        let second = complete_intake(&db, "tok-a", 99, r#"{"names":[]}"#)
            .await
            .unwrap();
        assert_eq!(second, IntakeTransition::AlreadyCompleted);

        let intake = get_intake(&db, "tok-a").await.unwrap().unwrap();
        assert_eq!(intake.traveler_count, 3);
        assert_eq!(intake.profile.as_deref(), Some(r#"{"names":["a","b","c"]}"#));
        assert!(intake.completed_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn complete_intake_for_unknown_session_reports_not_found() {
        let (db, _dir) = setup_db_with_trip().await;
        let result = complete_intake(&db, "no-such-token", 1, "{}").await.unwrap();
        assert_eq!(result, IntakeTransition::NotFound);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn touch_session_advances_last_activity() {
        let (db, _dir) = setup_db_with_trip().await;
        upsert_session(&db, "trip-1", "+31612345678", "tok-a")
            .await
            .unwrap();

        // Force a stale timestamp, then touch.
        db.connection()
            .call(|conn| -> rusqlite::Result<()> {
                conn.execute(
                    "UPDATE sessions SET last_activity_at = '2020-01-01T00:00:00.000Z'
                     WHERE token = 'tok-a'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        touch_session(&db, "tok-a").await.unwrap();
        let session = get_session(&db, "tok-a").await.unwrap().unwrap();
        assert!(session.last_activity_at > "2020-01-01T00:00:00.000Z".to_string());

        db.close().await.unwrap();
    }
}
