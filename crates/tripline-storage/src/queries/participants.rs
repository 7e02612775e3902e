// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Participant CRUD operations.

use rusqlite::params;
use tripline_core::TriplineError;

use crate::database::Database;
use crate::models::Participant;

/// Register a participant on a trip.
pub async fn add_participant(db: &Database, participant: &Participant) -> Result<(), TriplineError> {
    let participant = participant.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO participants (id, trip_id, phone, display_name, is_primary)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    participant.id,
                    participant.trip_id,
                    participant.phone,
                    participant.display_name,
                    participant.is_primary,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a trip's participants in registration order.
pub async fn list_participants(
    db: &Database,
    trip_id: &str,
) -> Result<Vec<Participant>, TriplineError> {
    let trip_id = trip_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, trip_id, phone, display_name, is_primary, created_at
                 FROM participants WHERE trip_id = ?1 ORDER BY rowid ASC",
            )?;
            let rows = stmt.query_map(params![trip_id], |row| {
                Ok(Participant {
                    id: row.get(0)?,
                    trip_id: row.get(1)?,
                    phone: row.get(2)?,
                    display_name: row.get(3)?,
                    is_primary: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut participants = Vec::new();
            for row in rows {
                participants.push(row?);
            }
            Ok(participants)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
