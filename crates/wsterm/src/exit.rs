use std::fmt;
use std::io;

use wsterm_session::SessionError;
use wsterm_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::TimedOut => TRANSPORT_ERROR,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidUrl { .. } | TransportError::UnsupportedScheme(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TransportError::Bind { source, .. } | TransportError::Accept(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::TransportUnavailable | SessionError::SessionClosed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        SessionError::Terminal(source) => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_url_is_usage_error() {
        let err = transport_error(
            "connect failed",
            TransportError::UnsupportedScheme("http".to_string()),
        );
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("connect failed: "));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let err = transport_error(
            "connect failed",
            TransportError::Connect {
                url: "ws://127.0.0.1:1/ws".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn session_errors_map_through_transport() {
        let err = session_error(
            "session failed",
            SessionError::Transport(TransportError::Shutdown),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = session_error("session failed", SessionError::SessionClosed);
        assert_eq!(err.code, FAILURE);
    }
}
