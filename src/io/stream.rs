//! The stream abstraction
//!
//! A [`Stream`] bundles eight operations behind one trait: byte read and
//! write, position (`tell`/`seek`), `flush`, `close`, and a runtime-typed
//! `serialize`/`deserialize` pair. File- and string-backed streams ship
//! with the crate; anything else implements the trait directly - the
//! trait object is the validated vtable.

use crate::error::{BytekitError, Result};

/// Seek origin with its offset, mirroring `SET`/`CUR`/`END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Absolute position from the start.
    Start(u64),
    /// Relative to the current position.
    Current(i64),
    /// Relative to the end.
    End(i64),
}

/// A runtime-typed value handed to [`Stream::serialize`].
///
/// This is the argument of the `%?` printing directive; default text-mode
/// serialization renders numbers with the standard formatters and writes
/// bytes through unchanged.
#[derive(Debug, Clone, Copy)]
pub enum SerialValue<'a> {
    /// Signed integer of any width, widened.
    Signed(i64),
    /// Unsigned integer of any width, widened.
    Unsigned(u64),
    /// Floating point value, widened.
    Float(f64),
    /// One raw byte.
    Char(u8),
    /// Raw bytes, written through unchanged.
    Bytes(&'a [u8]),
}

/// Mutable slot filled by [`Stream::deserialize`].
#[derive(Debug)]
pub enum SerialSlot<'a> {
    /// Receives a signed integer.
    Signed(&'a mut i64),
    /// Receives an unsigned integer.
    Unsigned(&'a mut u64),
    /// Receives a floating point value.
    Float(&'a mut f64),
    /// Receives one raw byte.
    Char(&'a mut u8),
}

/// Eight-operation stream interface.
pub trait Stream {
    /// Read up to `buf.len()` bytes; returns how many were read. Zero
    /// means end of data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write up to `buf.len()` bytes; returns how many were written.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Current byte position.
    fn tell(&mut self) -> Result<u64>;

    /// Move the position.
    fn seek(&mut self, origin: SeekOrigin) -> Result<()>;

    /// Flush internal buffers.
    fn flush(&mut self) -> Result<()>;

    /// Release the stream's kind-specific resources. Later operations
    /// fail; `close` itself is idempotent.
    fn close(&mut self) -> Result<()>;

    /// Write a runtime-typed value.
    ///
    /// The default is text mode: integers and floats through the
    /// standard formatters, bytes verbatim.
    fn serialize(&mut self, value: SerialValue<'_>) -> Result<()> {
        let text;
        let bytes: &[u8] = match value {
            SerialValue::Signed(v) => {
                text = v.to_string();
                text.as_bytes()
            }
            SerialValue::Unsigned(v) => {
                text = v.to_string();
                text.as_bytes()
            }
            SerialValue::Float(v) => {
                text = format!("{v:.6}");
                text.as_bytes()
            }
            SerialValue::Char(c) => return self.write_all(&[c]),
            SerialValue::Bytes(b) => b,
        };
        self.write_all(bytes)
    }

    /// Read a runtime-typed value. The bundled streams do not implement
    /// this; custom streams may.
    fn deserialize(&mut self, _slot: SerialSlot<'_>) -> Result<()> {
        Err(BytekitError::not_implemented("stream deserialization"))
    }

    /// Write the whole buffer or fail.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(BytekitError::io_error("stream refused further bytes"));
            }
            buf = &buf[n..];
        }
        Ok(())
    }

    /// Fill the whole buffer or fail.
    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.read(buf)?;
            if n == 0 {
                return Err(BytekitError::no_data("stream ended early"));
            }
            buf = &mut buf[n..];
        }
        Ok(())
    }
}

/// Stream over any [`std::io::Write`] sink.
///
/// Reading yields no data, seeking is unsupported, and `tell` reports
/// bytes written so far. Used for stdout/stderr printing.
pub struct WriterStream<W: std::io::Write> {
    writer: Option<W>,
    written: u64,
}

impl<W: std::io::Write> WriterStream<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            written: 0,
        }
    }

    /// Total bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    fn writer(&mut self) -> Result<&mut W> {
        self.writer
            .as_mut()
            .ok_or_else(|| BytekitError::io_error("stream is closed"))
    }
}

impl<W: std::io::Write> Stream for WriterStream<W> {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.writer()?.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.written)
    }

    fn seek(&mut self, _origin: SeekOrigin) -> Result<()> {
        Err(BytekitError::not_implemented("seek on a write-only sink"))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        Ok(())
    }
}
