// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log operations. The transcript is append-only: there is no
//! update or delete here by design.

use rusqlite::params;
use tripline_core::TriplineError;

use crate::database::Database;
use crate::models::ConversationMessage;

/// Append one transcript entry.
pub async fn append_message(
    db: &Database,
    msg: &ConversationMessage,
) -> Result<(), TriplineError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, session_token, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![msg.id, msg.session_token, msg.role, msg.content, msg.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Read a session's transcript in insertion order.
///
/// Ties on `created_at` (two entries in the same millisecond) fall back to
/// rowid, which reflects insertion order.
pub async fn get_transcript(
    db: &Database,
    session_token: &str,
    limit: Option<i64>,
) -> Result<Vec<ConversationMessage>, TriplineError> {
    let session_token = session_token.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_token, role, content, created_at
                         FROM messages WHERE session_token = ?1
                         ORDER BY created_at ASC, rowid ASC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![session_token, lim], |row| {
                        Ok(ConversationMessage {
                            id: row.get(0)?,
                            session_token: row.get(1)?,
                            role: row.get(2)?,
                            content: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    })?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_token, role, content, created_at
                         FROM messages WHERE session_token = ?1
                         ORDER BY created_at ASC, rowid ASC",
                    )?;
                    let rows = stmt.query_map(params![session_token], |row| {
                        Ok(ConversationMessage {
                            id: row.get(0)?,
                            session_token: row.get(1)?,
                            role: row.get(2)?,
                            content: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    })?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count a session's transcript entries.
pub async fn count_messages(db: &Database, session_token: &str) -> Result<i64, TriplineError> {
    let session_token = session_token.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE session_token = ?1",
                params![session_token],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trip;
    use crate::queries::sessions::upsert_session;
    use crate::queries::trips::create_trip;
    use tempfile::tempdir;

    async fn setup_db_with_session() -> (Database, tempfile::TempDir) {
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
            timezone: "UTC".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        create_trip(&db, &trip).await.unwrap();
        upsert_session(&db, "trip-1", "web:share-1", "sess-1")
            .await
            .unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, role: &str, content: &str, timestamp: &str) -> ConversationMessage {
        ConversationMessage {
            id: id.to_string(),
            session_token: "sess-1".to_string(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn append_and_read_in_order() {
        let (db, _dir) = setup_db_with_session().await;

        let m1 = make_msg("m1", "assistant", "welcome", "2026-01-01T00:00:01.000Z");
        let m2 = make_msg("m2", "traveler", "hi", "2026-01-01T00:00:02.000Z");
        let m3 = make_msg("m3", "assistant", "hello", "2026-01-01T00:00:03.000Z");

        append_message(&db, &m1).await.unwrap();
        append_message(&db, &m2).await.unwrap();
        append_message(&db, &m3).await.unwrap();

        let transcript = get_transcript(&db, "sess-1", None).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].id, "m1");
        assert_eq!(transcript[1].id, "m2");
        assert_eq!(transcript[2].id, "m3");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_millisecond_entries_keep_insertion_order() {
        let (db, _dir) = setup_db_with_session().await;

        let ts = "2026-01-01T00:00:01.000Z";
        append_message(&db, &make_msg("m1", "assistant", "welcome", ts))
            .await
            .unwrap();
        append_message(&db, &make_msg("m2", "traveler", "hi", ts))
            .await
            .unwrap();

        let transcript = get_transcript(&db, "sess-1", None).await.unwrap();
        assert_eq!(transcript[0].id, "m1");
        assert_eq!(transcript[1].id, "m2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transcript_limit_applies() {
        let (db, _dir) = setup_db_with_session().await;

        for i in 0..5 {
            let msg = make_msg(
                &format!("m{i}"),
                "traveler",
                &format!("msg {i}"),
                &format!("2026-01-01T00:00:0{i}.000Z"),
            );
            append_message(&db, &msg).await.unwrap();
        }

        let transcript = get_transcript(&db, "sess-1", Some(3)).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].id, "m0");
        assert_eq!(transcript[2].id, "m2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_messages_matches() {
        let (db, _dir) = setup_db_with_session().await;
        assert_eq!(count_messages(&db, "sess-1").await.unwrap(), 0);

        append_message(
            &db,
            &make_msg("m1", "traveler", "hi", "2026-01-01T00:00:01.000Z"),
        )
        .await
        .unwrap();
        assert_eq!(count_messages(&db, "sess-1").await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_role_is_rejected_by_schema() {
        let (db, _dir) = setup_db_with_session().await;
        let bad = make_msg("m1", "operator", "hi", "2026-01-01T00:00:01.000Z");
        assert!(append_message(&db, &bad).await.is_err());
        db.close().await.unwrap();
    }
}
