//! Hosted implementations backed by the standard library.
//!
//! [`SystemClock`] wraps [`Instant`]; [`ChannelLines`] adapts the receiving
//! end of an `mpsc` channel into a [`LineInput`], which is how a reader
//! thread (stdin, a TCP socket, a USB serial port) hands lines to a
//! [`SerialSource`](crate::source::SerialSource) without blocking the poll
//! loop.

use std::string::String;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use tracing::warn;

use crate::traits::{Clock, Line, LineInput};

/// Monotonic clock measuring from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// [`LineInput`] fed by an `mpsc` channel.
///
/// The link reports closed once every sender is gone and the buffered
/// lines have been read.
///
/// ```rust
/// use std::sync::mpsc;
/// use tank_control::hal::ChannelLines;
/// use tank_control::traits::LineInput;
///
/// let (tx, rx) = mpsc::channel();
/// let mut lines = ChannelLines::new(rx);
///
/// tx.send("fire_press".to_string()).unwrap();
/// drop(tx);
///
/// assert_eq!(lines.read_line().as_deref(), Some("fire_press"));
/// assert!(lines.read_line().is_none());
/// assert!(!lines.is_open());
/// ```
#[derive(Debug)]
pub struct ChannelLines {
    rx: Receiver<String>,
    open: bool,
}

impl ChannelLines {
    /// Wrap a receiver.
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx, open: true }
    }
}

impl LineInput for ChannelLines {
    fn read_line(&mut self) -> Option<Line> {
        loop {
            match self.rx.try_recv() {
                Ok(text) => {
                    let mut line = Line::new();
                    if line.push_str(&text).is_ok() {
                        return Some(line);
                    }
                    warn!(len = text.len(), "dropping overlong serial line");
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.open = false;
                    return None;
                }
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
