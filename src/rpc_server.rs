//! Topicmarks RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"import.batch", "params":{"format":"html","data":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"[code] message"}
//!
//! Logs go to stderr, filtered by `TOPICMARKS_LOG` (default `info`).

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use topicmarks::app::App;
use topicmarks::platform;
use topicmarks::rpc_handler::handle_line;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOPICMARKS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() -> ExitCode {
    init_tracing();

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(dir = %data_dir.display(), "cannot create data directory: {}", e);
        return ExitCode::FAILURE;
    }
    let db_path = platform::get_database_path();
    let app = match App::new(&db_path.to_string_lossy()) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            tracing::error!(db = %db_path.display(), "failed to open store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if respond(&mut out, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("stdin closed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&app, &line);

        if respond(&mut out, &response).is_err() {
            break;
        }
    }
    ExitCode::SUCCESS
}
