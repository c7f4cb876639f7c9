use std::io::Read;
use std::sync::mpsc;

use tracing::debug;
use wsterm_transport::{WsConfig, WsConnection};

use crate::error::Result;
use crate::pump::{spawn_input_reader, spawn_receiver, InputConfig};
use crate::session::{Session, SessionSummary};
use crate::terminal::TerminalSurface;

/// Connect to `url` and run a session until the remote side closes.
pub fn connect<R, S>(url: &str, input: R, surface: S) -> Result<SessionSummary>
where
    R: Read + Send + 'static,
    S: TerminalSurface,
{
    connect_with_config(url, &WsConfig::default(), input, surface, &InputConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config<R, S>(
    url: &str,
    ws_config: &WsConfig,
    input: R,
    surface: S,
    input_config: &InputConfig,
) -> Result<SessionSummary>
where
    R: Read + Send + 'static,
    S: TerminalSurface,
{
    let connection = WsConnection::connect(url, ws_config)?;
    attach(connection, input, surface, input_config)
}

/// Run a session over an established connection.
///
/// Spawns the receive loop and the input reader, consumes their events on
/// the calling thread, and closes the connection when the session ends. The
/// input reader is left detached since a blocked terminal read cannot be
/// interrupted.
pub fn attach<R, S>(
    connection: WsConnection,
    input: R,
    surface: S,
    input_config: &InputConfig,
) -> Result<SessionSummary>
where
    R: Read + Send + 'static,
    S: TerminalSurface,
{
    let (tx, rx) = mpsc::channel();
    let receiver = spawn_receiver(connection.clone(), tx.clone())?;
    spawn_input_reader(input, tx, input_config)?;

    let mut session = Session::new(connection.clone(), surface);
    let result = session.run(&rx);

    connection.close();
    if receiver.join().is_err() {
        debug!("receive loop panicked");
    }
    debug!(peer = connection.peer(), "session ended");
    result
}
