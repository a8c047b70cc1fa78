//! The pane-keyed session store (C5). A single table, keyed on pane id,
//! holding the live attention state of every pane the hook has observed.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::ids::{PaneId, SessionId};
use crate::pane_context::PaneContext;
use crate::transition::State;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored state for pane {pane_id} has an invalid encoding: {encoding:?}")]
    InvalidState { pane_id: String, encoding: String },
}

/// A pane-keyed session row as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub pane_id: PaneId,
    pub tmux_session: String,
    pub tmux_window: i64,
    pub tmux_pane: i64,
    pub tmux_location: String,
    pub session_id: SessionId,
    pub cwd: String,
    pub transcript_path: String,
    pub state: State,
    pub first_seen: String,
    pub last_updated: String,
    pub last_session_id: Option<SessionId>,
}

/// Upsert a pane's record. Preserves `first_seen`, refreshes `last_updated`,
/// and records `last_session_id` only when the incoming session id differs
/// from the row's current one.
pub fn upsert(
    conn: &Connection,
    ctx: &PaneContext,
    session_id: &SessionId,
    cwd: &str,
    transcript_path: &str,
    state: State,
) -> Result<(), StoreError> {
    let now = Utc::now().to_rfc3339();

    let existing_session_id: Option<String> = conn
        .query_row(
            "SELECT session_id FROM sessions WHERE pane_id = ?1",
            params![ctx.pane_id.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    let last_session_id: Option<String> = match &existing_session_id {
        Some(existing) if existing != session_id.as_str() => Some(existing.clone()),
        Some(_) => None,
        None => None,
    };

    conn.execute(
        "INSERT INTO sessions
            (pane_id, tmux_session, tmux_window, tmux_pane, tmux_location,
             session_id, cwd, transcript_path, state, first_seen, last_updated, last_session_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11)
         ON CONFLICT(pane_id) DO UPDATE SET
            tmux_session = excluded.tmux_session,
            tmux_window = excluded.tmux_window,
            tmux_pane = excluded.tmux_pane,
            tmux_location = excluded.tmux_location,
            session_id = excluded.session_id,
            cwd = excluded.cwd,
            transcript_path = excluded.transcript_path,
            state = excluded.state,
            last_updated = excluded.last_updated,
            last_session_id = COALESCE(excluded.last_session_id, sessions.last_session_id)",
        params![
            ctx.pane_id.as_str(),
            ctx.session_name,
            ctx.window_index,
            ctx.pane_index,
            ctx.location,
            session_id.as_str(),
            cwd,
            transcript_path,
            state.encode(),
            now,
            last_session_id,
        ],
    )?;

    Ok(())
}

/// Delete a pane's record by pane id. No-op if the pane has no record.
pub fn delete(conn: &Connection, pane_id: &PaneId) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM sessions WHERE pane_id = ?1",
        params![pane_id.as_str()],
    )?;
    Ok(())
}

/// Look up a pane's record by session id (used by the finder to join a
/// search hit's session id against the live pane-state table).
pub fn find_by_session_id(
    conn: &Connection,
    session_id: &SessionId,
) -> Result<Option<SessionRecord>, StoreError> {
    conn.query_row(
        "SELECT pane_id, tmux_session, tmux_window, tmux_pane, tmux_location,
                session_id, cwd, transcript_path, state, first_seen, last_updated, last_session_id
         FROM sessions WHERE session_id = ?1",
        params![session_id.as_str()],
        row_to_record,
    )
    .optional()?
    .transpose()
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Result<SessionRecord, StoreError>> {
    let pane_id: String = row.get(0)?;
    let encoding: String = row.get(8)?;
    let state = match State::decode(&encoding) {
        Some(s) => s,
        None => {
            return Ok(Err(StoreError::InvalidState {
                pane_id,
                encoding,
            }))
        }
    };

    Ok(Ok(SessionRecord {
        pane_id: PaneId::new(pane_id),
        tmux_session: row.get(1)?,
        tmux_window: row.get(2)?,
        tmux_pane: row.get(3)?,
        tmux_location: row.get(4)?,
        session_id: SessionId::new(row.get::<_, String>(5)?),
        cwd: row.get(6)?,
        transcript_path: row.get(7)?,
        state,
        first_seen: row.get(9)?,
        last_updated: row.get(10)?,
        last_session_id: row.get::<_, Option<String>>(11)?.map(SessionId::new),
    }))
}
