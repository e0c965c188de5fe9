//! In-memory output target for process-group tests.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use wyp::output::OutputTarget;
use wyp::types::StreamKind;

type Buffer = Arc<Mutex<Vec<u8>>>;

/// Records what each runner writes, per stream, across restarts.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutput {
    buffers: Arc<Mutex<HashMap<(usize, StreamKind), Buffer>>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self, index: usize, stream: StreamKind) -> Buffer {
        let mut buffers = self.buffers.lock().unwrap();
        Arc::clone(buffers.entry((index, stream)).or_default())
    }

    /// Raw bytes written to `stream` by runner `index`, colours included.
    pub fn raw(&self, index: usize, stream: StreamKind) -> String {
        let buffer = self.buffer(index, stream);
        let bytes = buffer.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Stdout of runner `index` with colour codes removed.
    pub fn stdout(&self, index: usize) -> String {
        strip_ansi(&self.raw(index, StreamKind::Stdout))
    }

    /// Stderr of runner `index` with colour codes removed.
    pub fn stderr(&self, index: usize) -> String {
        strip_ansi(&self.raw(index, StreamKind::Stderr))
    }
}

impl OutputTarget for CaptureOutput {
    fn writer(&self, index: usize, stream: StreamKind) -> Box<dyn Write + Send> {
        Box::new(SharedWriter(self.buffer(index, stream)))
    }
}

struct SharedWriter(Buffer);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Remove SGR escape sequences (`ESC [ ... m`).
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
