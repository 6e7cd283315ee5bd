// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Capture the JSON log lines emitted on the current thread.

use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logs are collected until this is dropped. Only events on the creating
/// thread are seen, so use it from a current-thread `#[tokio::test]`.
pub struct LogCapture {
    sink: SharedBuffer,
    _guard: DefaultGuard,
}

pub fn capture() -> LogCapture {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::DEBUG)
        .finish();

    LogCapture {
        _guard: tracing::subscriber::set_default(subscriber),
        sink,
    }
}

impl LogCapture {
    pub fn lines(&self) -> Vec<Value> {
        let bytes = self.sink.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Events at `level` (`"ERROR"`, `"DEBUG"`, ...).
    pub fn at_level(&self, level: &str) -> Vec<Value> {
        self.lines()
            .into_iter()
            .filter(|line| line["level"] == level)
            .collect()
    }
}
