//! Stdio collaborator for the session engine.
//!
//! Reads one JSON request per line (`{"op": "...", ...args}`), dispatches it
//! through the engine, and prints one payload JSON object per line. A
//! presentation layer renders those payloads; this shell never does.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use lectern_core::dispatch::{Engine, Payload};
use lectern_store_fs::{FsConfigStore, FsDocumentSource};
use log::info;
use serde_json::{Value, json};

#[path = "main/env_config.rs"]
mod env_config;

fn main() -> Result<()> {
    env_logger::init();

    let settings = env_config::engine_settings_from_env();
    let library_dir = env_config::library_dir_from_env();
    info!(
        "lectern: scroll_step={} save_quiet_ms={} library={}",
        settings.scroll_step,
        settings.save_quiet_ms,
        library_dir.display()
    );

    let mut engine = Engine::new(FsConfigStore::new(), FsDocumentSource::new(), settings);
    let started = Instant::now();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let request = line.trim();
        if request.is_empty() {
            continue;
        }

        let now_ms = started.elapsed().as_millis() as u64;
        let payload = match parse_request(request, &library_dir) {
            Ok((op, args)) => engine.dispatch(&op, &args, now_ms),
            Err(message) => Payload::Error { message },
        };
        emit(&mut stdout, &payload)?;

        if let Some(notice) = engine.tick(started.elapsed().as_millis() as u64) {
            emit(&mut stdout, &notice)?;
        }
    }

    // End of input closes the document; the final position must survive.
    if engine.has_open_document() {
        emit(&mut stdout, &engine.close_document())?;
    }
    Ok(())
}

fn emit(stdout: &mut impl Write, payload: &Payload) -> Result<()> {
    writeln!(stdout, "{}", serde_json::to_string(payload)?)?;
    stdout.flush()?;
    Ok(())
}

/// Splits a request line into its operation name and argument object.
/// `listLibrary` defaults to the configured library directory, which this
/// shell owns, not the engine.
fn parse_request(line: &str, library_dir: &Path) -> Result<(String, Value), String> {
    let mut value: Value =
        serde_json::from_str(line).map_err(|error| format!("bad request: {error}"))?;
    let op = value
        .get("op")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| "request is missing \"op\"".to_owned())?;

    if let Some(args) = value.as_object_mut() {
        args.remove("op");
        if op == "listLibrary" && !args.contains_key("dir") {
            args.insert("dir".to_owned(), json!(library_dir));
        }
    }
    Ok((op, value))
}
