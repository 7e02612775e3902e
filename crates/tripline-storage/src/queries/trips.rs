// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trip CRUD operations.

use rusqlite::params;
use tripline_core::TriplineError;

use crate::database::Database;
use crate::models::Trip;

fn row_to_trip(row: &rusqlite::Row<'_>) -> Result<Trip, rusqlite::Error> {
    Ok(Trip {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        share_token: row.get(3)?,
        profile_template: row.get(4)?,
        behavior_notes: row.get(5)?,
        itinerary_ref: row.get(6)?,
        timezone: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const TRIP_COLUMNS: &str = "id, tenant_id, name, share_token, profile_template, \
                            behavior_notes, itinerary_ref, timezone, created_at, updated_at";

/// Create a new trip.
pub async fn create_trip(db: &Database, trip: &Trip) -> Result<(), TriplineError> {
    let trip = trip.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO trips (id, tenant_id, name, share_token, profile_template,
                                    behavior_notes, itinerary_ref, timezone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    trip.id,
                    trip.tenant_id,
                    trip.name,
                    trip.share_token,
                    trip.profile_template,
                    trip.behavior_notes,
                    trip.itinerary_ref,
                    trip.timezone,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a trip by ID.
pub async fn get_trip(db: &Database, id: &str) -> Result<Option<Trip>, TriplineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_trip);
            match result {
                Ok(trip) => Ok(Some(trip)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a trip by its public share token.
pub async fn get_trip_by_share_token(
    db: &Database,
    share_token: &str,
) -> Result<Option<Trip>, TriplineError> {
    let share_token = share_token.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRIP_COLUMNS} FROM trips WHERE share_token = ?1"
            ))?;
            let result = stmt.query_row(params![share_token], row_to_trip);
            match result {
                Ok(trip) => Ok(Some(trip)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update the operator-mutable content fields of a trip.
///
/// `share_token` is deliberately absent from the SET list: it is immutable
/// for the trip's lifetime.
pub async fn update_trip_content(
    db: &Database,
    id: &str,
    profile_template: Option<&str>,
    behavior_notes: Option<&str>,
    itinerary_ref: Option<&str>,
) -> Result<(), TriplineError> {
    let id = id.to_string();
    let profile_template = profile_template.map(str::to_string);
    let behavior_notes = behavior_notes.map(str::to_string);
    let itinerary_ref = itinerary_ref.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE trips SET profile_template = ?1, behavior_notes = ?2,
                        itinerary_ref = ?3,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![profile_template, behavior_notes, itinerary_ref, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
