use std::io::{self, Write};

use axum::body::Bytes;
use tokio::sync::mpsc;

/// Chunk type carried from the render thread to the response body.
pub type Chunk = io::Result<Bytes>;

/// Blocking [`Write`] adapter that forwards every write as one chunk on a bounded channel.
///
/// Meant for `spawn_blocking` threads. Once the receiving side is gone (the client hung up or
/// the response was dropped) every write fails with [`io::ErrorKind::BrokenPipe`].
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    tx: mpsc::Sender<Chunk>,
}

impl ChannelWriter {
    pub fn new(tx: mpsc::Sender<Chunk>) -> Self {
        Self { tx }
    }

    /// Forward a terminal error to the body so the response is aborted rather than truncated.
    pub fn abort(&self, err: io::Error) {
        let _ = self.tx.blocking_send(Err(err));
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
