mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "wsterm", version, about = "Remote terminal over a multiplexed WebSocket")]
struct Cli {
    /// Report format (session summaries, listener announcements).
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH", env = "WSTERM_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_format, cli.log_level, cli.log_file.as_deref()) {
        eprintln!("error: cannot open log file: {err}");
        std::process::exit(exit::USAGE);
    }

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stderr);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_subcommand() {
        let cli = Cli::try_parse_from([
            "wsterm",
            "connect",
            "ws://localhost:8080/ws",
            "--raw",
            "--summary",
            "--poll-interval",
            "5ms",
        ])
        .expect("connect args should parse");

        match cli.command {
            Command::Connect(args) => {
                assert_eq!(args.url, "ws://localhost:8080/ws");
                assert!(args.raw);
                assert!(args.summary);
                assert_eq!(args.poll_interval, "5ms");
                assert_eq!(args.connect_timeout, "10s");
            }
            other => panic!("expected connect, got {other:?}"),
        }
    }

    #[test]
    fn parses_echo_subcommand_with_channel() {
        let cli = Cli::try_parse_from([
            "wsterm",
            "echo",
            "127.0.0.1:0",
            "--channel",
            "stderr",
            "--once",
        ])
        .expect("echo args should parse");

        match cli.command {
            Command::Echo(args) => {
                assert_eq!(args.channel, cmd::ReplyChannel::Stderr);
                assert!(args.once);
            }
            other => panic!("expected echo, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_reply_channel() {
        let err = Cli::try_parse_from(["wsterm", "echo", "127.0.0.1:0", "--channel", "input"])
            .expect_err("input is not a reply channel");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wsterm",
            "version",
            "--log-level",
            "debug",
            "--format",
            "json",
        ])
        .expect("global flags should parse anywhere");
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn connect_requires_url() {
        let err = Cli::try_parse_from(["wsterm", "connect"]).expect_err("url is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
