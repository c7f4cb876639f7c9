//! Loopback example: an in-process echo endpoint and a terminal session
//! talking to it over a real WebSocket.
//!
//! Run with:
//!   cargo run --example loopback

use std::io::Cursor;
use std::thread;

use bytes::Bytes;
use wsterm::frame::{decode_frame, Frame, Tag};
use wsterm::session::connect;
use wsterm::transport::{Incoming, MessageSource, MessageTransport, WsConfig, WsListener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = WsListener::bind("127.0.0.1:0", WsConfig::default())?;
    let url = format!("ws://{}/ws", listener.local_addr()?);

    let server = thread::spawn(
        move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut conn = listener.accept()?;
            eprintln!("[server] peer connected: {}", conn.peer());

            // Echo the first input frame on stdout, then report on stderr.
            let input = loop {
                match conn.recv()? {
                    Some(Incoming::Message(message)) => break decode_frame(message)?,
                    Some(Incoming::Closed) => return Ok(()),
                    None => {}
                }
            };
            eprintln!(
                "[server] channel={} payload={}",
                input.channel,
                String::from_utf8_lossy(&input.payload)
            );

            conn.send(Frame::new(Tag::Stdout, input.payload.clone()).to_message()?)?;
            conn.send(Frame::new(Tag::Stderr, Bytes::from_static(b"[remote] done\n")).to_message()?)?;
            conn.close();
            Ok(())
        },
    );

    let summary = connect(&url, Cursor::new(b"echo hello\n".to_vec()), std::io::stdout())?;

    server
        .join()
        .map_err(|_| "server thread panicked")?
        .map_err(|err| err.to_string())?;

    eprintln!(
        "[client] stdout={}B stderr={}B input={}B",
        summary.stdout_bytes, summary.stderr_bytes, summary.input_bytes
    );
    Ok(())
}
