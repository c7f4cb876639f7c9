use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use wsterm_frame::{decode_frame, encode_frame, Channel, Tag};
use wsterm_transport::{
    Incoming, MessageSource, MessageTransport, TransportError, WsConfig, WsConnection, WsListener,
};

use crate::cmd::EchoArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_listening, OutputFormat};

/// How often the idle accept loop checks for Ctrl-C.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What to do with one message received by the echo endpoint.
#[derive(Debug, PartialEq, Eq)]
enum EchoAction {
    Reply(Bytes),
    Ignore,
}

pub fn run(args: EchoArgs, format: OutputFormat) -> CliResult<i32> {
    let listener = WsListener::bind(&args.addr, WsConfig::default())
        .map_err(|err| transport_error("bind failed", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| transport_error("bind failed", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| transport_error("listener setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    // Announce only once Ctrl-C is handled, so scripts may signal right away.
    let reply = args.channel.tag();
    print_listening(addr, reply.name(), format);

    while running.load(Ordering::SeqCst) {
        let conn = match listener.poll_accept() {
            Ok(Some(conn)) => conn,
            Ok(None) => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
            Err(err @ TransportError::Handshake { .. }) => {
                tracing::warn!(error = %err, "rejected connection");
                continue;
            }
            Err(err) => return Err(transport_error("accept failed", err)),
        };

        tracing::info!(peer = conn.peer(), "session started");
        match serve(conn, reply, &running) {
            Ok(echoed) => tracing::info!(echoed, "session ended"),
            Err(err) => tracing::warn!(error = %err, "session aborted"),
        }

        if args.once {
            break;
        }
    }

    Ok(SUCCESS)
}

fn serve(
    mut conn: WsConnection,
    reply: Tag,
    running: &AtomicBool,
) -> Result<u64, TransportError> {
    let mut echoed = 0u64;
    while running.load(Ordering::SeqCst) {
        let message = match conn.recv()? {
            Some(Incoming::Message(message)) => message,
            Some(Incoming::Closed) => return Ok(echoed),
            None => continue,
        };

        if let EchoAction::Reply(response) = classify(message, reply) {
            conn.send(response)?;
            echoed = echoed.saturating_add(1);
        }
    }
    conn.close();
    Ok(echoed)
}

fn classify(message: Bytes, reply: Tag) -> EchoAction {
    let frame = match decode_frame(message) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring frame");
            return EchoAction::Ignore;
        }
    };

    if frame.channel != Channel::Input {
        tracing::warn!(channel = %frame.channel, "ignoring frame on non-input channel");
        return EchoAction::Ignore;
    }

    let mut buf = BytesMut::new();
    match encode_frame(reply.into(), &frame.payload, &mut buf) {
        Ok(()) => EchoAction::Reply(buf.freeze()),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode reply");
            EchoAction::Ignore
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_echoed_on_reply_channel() {
        let action = classify(Bytes::from_static(b"\x00ls\r"), Tag::Stdout);
        assert_eq!(action, EchoAction::Reply(Bytes::from_static(b"\x01ls\r")));

        let action = classify(Bytes::from_static(b"\x00oops"), Tag::Stderr);
        assert_eq!(action, EchoAction::Reply(Bytes::from_static(b"\x02oops")));
    }

    #[test]
    fn empty_input_is_echoed_as_bare_tag() {
        let action = classify(Bytes::from_static(b"\x00"), Tag::Stdout);
        assert_eq!(action, EchoAction::Reply(Bytes::from_static(b"\x01")));
    }

    #[test]
    fn output_and_malformed_frames_are_ignored() {
        assert_eq!(classify(Bytes::new(), Tag::Stdout), EchoAction::Ignore);
        assert_eq!(
            classify(Bytes::from_static(b"\x01out"), Tag::Stdout),
            EchoAction::Ignore
        );
        assert_eq!(
            classify(Bytes::from_static(b"\x05new"), Tag::Stdout),
            EchoAction::Ignore
        );
    }
}
