use wsterm_session::{attach, InputConfig};
use wsterm_transport::{WsConfig, WsConnection};

use crate::cmd::{parse_duration, ConnectArgs};
use crate::exit::{io_error, session_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let ws_config = WsConfig {
        max_message_size: args.max_message_size,
        poll_interval: parse_duration(&args.poll_interval)?,
        connect_timeout: parse_duration(&args.connect_timeout)?,
    };
    let input_config = InputConfig {
        chunk_size: args.chunk_size,
    };

    let connection = WsConnection::connect(&args.url, &ws_config)
        .map_err(|err| transport_error("connect failed", err))?;
    let peer = connection.peer().to_string();

    let raw_mode = if args.raw {
        Some(RawMode::enable()?)
    } else {
        None
    };
    let result = attach(connection, std::io::stdin(), std::io::stdout(), &input_config);
    drop(raw_mode);

    let summary = result.map_err(|err| session_error("session failed", err))?;
    tracing::info!(peer = %peer, "remote closed the session");

    if args.summary {
        print_summary(&summary, &peer, format);
    }
    Ok(SUCCESS)
}

/// Keeps the local terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> CliResult<Self> {
        crossterm::terminal::enable_raw_mode()
            .map_err(|err| io_error("enabling raw mode failed", err))?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!(error = %err, "failed to restore terminal mode");
        }
    }
}
