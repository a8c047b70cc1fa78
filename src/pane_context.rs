//! Queries the terminal multiplexer for the four display variables that
//! identify the pane a hook invocation is running in. Failure here is not
//! an error condition — it simply means there is no pane to update state
//! for, which the hook treats as "exit zero, do nothing".

use std::process::Command;

use crate::ids::PaneId;

/// The four display variables tmux can report for the current pane, plus
/// a rendered `{session}:{window}.{pane}` location string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneContext {
    pub pane_id: PaneId,
    pub session_name: String,
    pub window_index: i64,
    pub pane_index: i64,
    pub location: String,
}

/// Reads the current pane's context from tmux. Returns `None` if the
/// process is not inside a multiplexer (`TMUX` unset) or if any one of
/// the four queries fails.
pub fn read_pane_context() -> Option<PaneContext> {
    if std::env::var_os("TMUX").is_none() {
        return None;
    }

    let pane_id = query("#{pane_id}")?;
    let session_name = query("#{session_name}")?;
    let window_index = query("#{window_index}")?.parse::<i64>().ok()?;
    let pane_index = query("#{pane_index}")?.parse::<i64>().ok()?;

    let location = format!("{session_name}:{window_index}.{pane_index}");

    Some(PaneContext {
        pane_id: PaneId::new(pane_id),
        session_name,
        window_index,
        pane_index,
        location,
    })
}

/// Runs `tmux display-message -p <format>` and returns the trimmed single
/// line of output, or `None` on any subprocess failure.
fn query(format: &str) -> Option<String> {
    let output = Command::new("tmux")
        .args(["display-message", "-p", format])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
