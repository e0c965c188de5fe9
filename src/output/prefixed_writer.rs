// src/output/prefixed_writer.rs

use std::io::{self, Write};

use owo_colors::{AnsiColors, OwoColorize};

/// Writer that labels every line of a child's output.
///
/// A prefix is emitted before the first byte ever written and before any
/// byte that follows a `\n` or `\r`. The decision is made byte by byte with
/// state carried across calls, so arbitrary chunk boundaries produce the same
/// output as one large write, carriage-return progress redraws get
/// re-labelled, and an unterminated line is never prefixed twice.
///
/// Each call renders prefix and payload into one buffer and hands it to the
/// sink in a single `write_all`, keeping lines from different children from
/// interleaving mid-line where the sink allows it.
///
/// Errors from the sink are swallowed: terminal output is best effort.
#[derive(Debug)]
pub struct PrefixedWriter<W: Write> {
    inner: W,
    prefix: Vec<u8>,
    wrote_any: bool,
    last_byte: u8,
}

impl<W: Write> PrefixedWriter<W> {
    /// Build a writer whose prefix is `[name] `, coloured when `color` is
    /// given. An empty `name` means no prefix at all.
    pub fn new(inner: W, name: &str, color: Option<AnsiColors>) -> Self {
        let prefix = match (name.is_empty(), color) {
            (true, _) => String::new(),
            (false, Some(color)) => format!("[{name}] ").color(color).to_string(),
            (false, None) => format!("[{name}] "),
        };

        Self {
            inner,
            prefix: prefix.into_bytes(),
            wrote_any: false,
            last_byte: 0,
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn needs_prefix(&self) -> bool {
        !self.wrote_any || self.last_byte == b'\n' || self.last_byte == b'\r'
    }

    fn render(&mut self, buf: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(buf.len() + self.prefix.len());
        for &byte in buf {
            if self.needs_prefix() {
                out.extend_from_slice(&self.prefix);
            }
            out.push(byte);
            self.wrote_any = true;
            self.last_byte = byte;
        }
        out
    }
}

impl<W: Write> Write for PrefixedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let out = self.render(buf);
        let _ = self.inner.write_all(&out);
        let _ = self.inner.flush();

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.inner.flush();
        Ok(())
    }
}
