mod config;
mod db;
mod export;
mod ipc;
mod model;
mod routes;
mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Attendance sidecar: newline-delimited JSON requests on stdin, one response per line on stdout.
#[derive(Parser)]
#[command(name = "attendanced")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workspace folder to open at startup, as if `workspace.select` had been sent.
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Log filter, overrides the config file. `RUST_LOG` wins over both.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;
    config.validate()?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let mut state = ipc::AppState::new(config);
    if let Some(path) = cli.workspace.as_deref() {
        ipc::select_workspace(&mut state, path)
            .with_context(|| format!("failed to open workspace {}", path.display()))?;
    }
    info!(version = env!("CARGO_PKG_VERSION"), "attendanced ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                // No id to echo back.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, shutting down");
    Ok(())
}
