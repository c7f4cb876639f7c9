use std::io::IsTerminal;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wsterm_session::SessionSummary;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    /// Reports go to stderr, since stdout carries the remote session.
    pub fn default_for_stderr() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    event: &'a str,
    peer: &'a str,
    #[serde(flatten)]
    summary: &'a SessionSummary,
    timestamp: String,
}

#[derive(Serialize)]
struct ListeningOutput {
    event: &'static str,
    addr: String,
    channel: &'static str,
}

pub fn print_summary(summary: &SessionSummary, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                event: "session_end",
                peer,
                summary,
                timestamp: now_unix_seconds(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "FRAMES", "BYTES", "DROPPED"])
                .add_row(vec![
                    "input".to_string(),
                    summary.input_frames.to_string(),
                    summary.input_bytes.to_string(),
                    summary.input_refused.to_string(),
                ])
                .add_row(vec![
                    "stdout".to_string(),
                    summary.stdout_frames.to_string(),
                    summary.stdout_bytes.to_string(),
                    "-".to_string(),
                ])
                .add_row(vec![
                    "stderr".to_string(),
                    summary.stderr_frames.to_string(),
                    summary.stderr_bytes.to_string(),
                    "-".to_string(),
                ])
                .add_row(vec![
                    "other".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    dropped_total(summary).to_string(),
                ]);
            eprintln!("{table}");
        }
        OutputFormat::Pretty => {
            eprintln!(
                "peer={} input={}/{}B stdout={}/{}B stderr={}/{}B dropped={} refused={}",
                peer,
                summary.input_frames,
                summary.input_bytes,
                summary.stdout_frames,
                summary.stdout_bytes,
                summary.stderr_frames,
                summary.stderr_bytes,
                dropped_total(summary),
                summary.input_refused,
            );
        }
    }
}

/// Announce a bound listener on stdout. Always one line, so scripts can read it.
pub fn print_listening(addr: SocketAddr, channel: &'static str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ListeningOutput {
                event: "listening",
                addr: addr.to_string(),
                channel,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("listening on ws://{addr}/ (echo to {channel})");
        }
    }
}

fn dropped_total(summary: &SessionSummary) -> u64 {
    summary
        .dropped_malformed
        .saturating_add(summary.dropped_unknown_channel)
        .saturating_add(summary.dropped_input)
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
