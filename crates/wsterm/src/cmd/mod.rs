use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use wsterm_frame::Tag;
use wsterm_session::DEFAULT_INPUT_CHUNK_SIZE;
use wsterm_transport::ws::DEFAULT_MAX_MESSAGE_SIZE;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod connect;
pub mod echo;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open an interactive session against a remote terminal endpoint.
    Connect(ConnectArgs),
    /// Serve a loopback endpoint that echoes input back as output.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Connect(args) => connect::run(args, format),
        Command::Echo(args) => echo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// WebSocket URL of the remote endpoint (e.g. ws://localhost:8080/ws).
    pub url: String,
    /// Put the local terminal in raw mode for the duration of the session.
    #[arg(long)]
    pub raw: bool,
    /// Print session counters to stderr when the session ends.
    #[arg(long)]
    pub summary: bool,
    /// How long each receive poll waits (e.g. 10ms).
    #[arg(long, default_value = "10ms")]
    pub poll_interval: String,
    /// TCP connect and handshake timeout (e.g. 10s).
    #[arg(long, default_value = "10s")]
    pub connect_timeout: String,
    /// Largest inbound message accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
    /// Largest single input read, in bytes.
    #[arg(long, default_value_t = DEFAULT_INPUT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind (e.g. 127.0.0.1:8080; port 0 picks a free port).
    pub addr: String,
    /// Output channel echoed input is sent back on.
    #[arg(long, value_enum, default_value = "stdout")]
    pub channel: ReplyChannel,
    /// Exit after the first session ends.
    #[arg(long)]
    pub once: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReplyChannel {
    Stdout,
    Stderr,
}

impl ReplyChannel {
    pub fn tag(self) -> Tag {
        match self {
            ReplyChannel::Stdout => Tag::Stdout,
            ReplyChannel::Stderr => Tag::Stderr,
        }
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `5s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn reply_channel_tags() {
        assert_eq!(ReplyChannel::Stdout.tag(), Tag::Stdout);
        assert_eq!(ReplyChannel::Stderr.tag(), Tag::Stderr);
    }
}
