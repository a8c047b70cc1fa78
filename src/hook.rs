//! The hook entry point (C6): one request, read from stdin, applied
//! against the session store. Every failure mode — bad JSON, no pane
//! context, a store write error — is absorbed; the caller always exits
//! zero so the upstream event producer is never blocked.

use rusqlite::Connection;

use crate::event::{self, Event};
use crate::ids::SessionId;
use crate::pane_context::{self, PaneContext};
use crate::store;
use crate::transition::{self, Transition};

/// Runs the hook's single-request state machine against an already-open
/// connection and an already-read stdin payload. Pulled out of `main` so
/// it can be exercised by tests without touching a real pane or stdin.
pub fn run(conn: &Connection, raw_stdin: &str) {
    let payload: serde_json::Value = match serde_json::from_str(raw_stdin) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("hook payload is not valid JSON: {e}");
            return;
        }
    };

    let Some(event) = event::decode(&payload) else {
        tracing::debug!("payload did not decode to a known event");
        return;
    };

    let Some(ctx) = pane_context::read_pane_context() else {
        tracing::debug!("no pane context; skipping state update");
        return;
    };

    if let Event::SessionEnd { .. } = &event {
        if let Err(e) = store::delete(conn, &ctx.pane_id) {
            tracing::warn!("failed to delete session row: {e}");
        }
        return;
    }

    match transition::transition(&event) {
        Transition::NoChange => {}
        Transition::Delete => {
            if let Err(e) = store::delete(conn, &ctx.pane_id) {
                tracing::warn!("failed to delete session row: {e}");
            }
        }
        Transition::To(state) => {
            if let Err(e) = apply_upsert(conn, &ctx, &payload, state) {
                tracing::warn!("failed to upsert session row: {e}");
            }
        }
    }
}

fn apply_upsert(
    conn: &Connection,
    ctx: &PaneContext,
    payload: &serde_json::Value,
    state: transition::State,
) -> Result<(), store::StoreError> {
    let session_id = payload
        .get("session_id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");
    let cwd = payload
        .get("cwd")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    let transcript_path = payload
        .get("transcript_path")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");

    store::upsert(
        conn,
        ctx,
        &SessionId::new(session_id),
        cwd,
        transcript_path,
        state,
    )
}
