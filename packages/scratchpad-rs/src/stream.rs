// Newline-delimited line client for the state feed
//
// Connects to the sensor process over TCP and hands back one decoded line at a
// time. Bytes are buffered until a full `\n`-terminated line is available, so a
// record split across two socket reads is reassembled before it is yielded.

use crate::error::{Result, ScratchpadError};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::net::TcpStream;

/// Size of a single underlying read
pub const READ_CHUNK_SIZE: usize = 1024;

/// Splits an arbitrary byte stream into complete lines.
///
/// Bytes after the last terminator stay pending and are prefixed to the next
/// push. Lines are decoded as UTF-8 (lossy) only once complete, so a multibyte
/// character split across reads survives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every line completed by them, in arrival order
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(|raw| {
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                String::from_utf8_lossy(raw).into_owned()
            })
            .collect()
    }

    /// Number of bytes waiting for a terminator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Blocking line reader over any byte source.
///
/// `next_line` returns `Ok(None)` once the peer has closed the stream, and
/// keeps returning it afterwards.
pub struct StreamingLineClient<R> {
    reader: R,
    buffer: LineBuffer,
    queued: VecDeque<String>,
    closed: bool,
}

impl StreamingLineClient<TcpStream> {
    /// Open a TCP connection to `host:port`
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        log::info!("Connecting to state feed: {}", addr);

        let stream = TcpStream::connect(&addr).map_err(|e| {
            ScratchpadError::Connection(format!("TCP connection to {} failed: {}", addr, e))
        })?;

        log::info!("State feed connected");
        Ok(Self::from_reader(stream))
    }
}

impl<R: Read> StreamingLineClient<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buffer: LineBuffer::new(),
            queued: VecDeque::new(),
            closed: false,
        }
    }

    /// Block until one complete line is available or the stream ends
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(line) = self.queued.pop_front() {
                return Ok(Some(line));
            }

            if self.closed {
                return Ok(None);
            }

            let read = match self.reader.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if read == 0 {
                if self.buffer.pending_len() > 0 {
                    log::debug!(
                        "Discarding {} unterminated bytes at end of stream",
                        self.buffer.pending_len()
                    );
                }
                self.closed = true;
                continue;
            }

            self.queued.extend(self.buffer.push(&chunk[..read]));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed && self.queued.is_empty()
    }

}
