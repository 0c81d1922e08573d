mod backup;
mod calc;
mod config;
mod db;
mod error;
mod ipc;
mod models;
mod quran;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};
use store::Store;

fn open_store(args: &config::Args) -> anyhow::Result<Store> {
    match args.workspace.as_deref() {
        Some(path) => {
            tracing::info!(workspace = %path.display(), "opening workspace store");
            Store::open_workspace(path)
        }
        None => {
            tracing::info!("using in-memory store");
            Store::open_in_memory()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    config::init_logging(&args.log);

    let mut state = ipc::AppState {
        workspace: args.workspace.clone(),
        store: open_store(&args)?,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => {
                tracing::debug!(id = %req.id, method = %req.method, "request");
                let method = req.method.clone();
                let resp = ipc::handle_request(&mut state, req);
                if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
                    let code = resp
                        .get("error")
                        .and_then(|e| e.get("code"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown");
                    tracing::warn!(%method, code, "request failed");
                }
                resp
            }
            Err(e) => {
                // No id to echo back.
                tracing::warn!(error = %e, "unparseable request line");
                ipc::err("", "bad_json", e.to_string(), None)
            }
        };

        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    Ok(())
}
