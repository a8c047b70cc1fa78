//! The hook binary (C6): invoked on every assistant lifecycle event. Reads
//! one event record from stdin and always exits zero — the upstream event
//! producer blocks on this process, so nothing here is allowed to fail
//! loudly or slowly.

use std::io::Read;

use claudes_steward::config;
use claudes_steward::db;

fn main() {
    // No CLI args, no tracing-subscriber init: both cost milliseconds this
    // binary's <100ms budget can't spend, and a silent failure here is the
    // spec'd behaviour anyway.
    let mut raw_stdin = String::new();
    if std::io::stdin().read_to_string(&mut raw_stdin).is_err() {
        std::process::exit(0);
    }

    let cfg = config::load_config(None).unwrap_or_default();
    let db_path = cfg.resolved_db_path();

    let conn = match db::open(&db_path) {
        Ok(c) => c,
        Err(_) => std::process::exit(0),
    };

    claudes_steward::hook::run(&conn, &raw_stdin);
    std::process::exit(0);
}
