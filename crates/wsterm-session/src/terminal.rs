use std::io::{self, Write};

/// The write side of a terminal surface.
///
/// Payload bytes are opaque; escape sequences are the surface's business.
pub trait TerminalSurface {
    /// Render one chunk of remote output.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: Write> TerminalSurface for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}
