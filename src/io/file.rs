//! File-backed streams and whole-file helpers

use super::stream::{SeekOrigin, Stream};
use crate::error::{BytekitError, Result};
use crate::string::FlexStr;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Stream over a platform file handle.
pub struct FileStream {
    file: Option<File>,
}

impl FileStream {
    /// Open an existing file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: Some(File::open(path)?),
        })
    }

    /// Create (or truncate) a file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: Some(File::create(path)?),
        })
    }

    /// Open a file for reading and writing, creating it if missing.
    pub fn open_rw(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file: Some(file) })
    }

    /// Wrap an already-open file handle.
    pub fn from_file(file: File) -> Self {
        Self { file: Some(file) }
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| BytekitError::io_error("stream is closed"))
    }
}

impl Stream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file()?.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.file()?.write(buf)?)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.file()?.stream_position()?)
    }

    fn seek(&mut self, origin: SeekOrigin) -> Result<()> {
        let from = match origin {
            SeekOrigin::Start(off) => SeekFrom::Start(off),
            SeekOrigin::Current(off) => SeekFrom::Current(off),
            SeekOrigin::End(off) => SeekFrom::End(off),
        };
        self.file()?.seek(from)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.file()?.flush()?)
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the handle closes it.
        self.file.take();
        Ok(())
    }
}

/// Append the whole file at `path` onto `out`.
pub fn read_file(path: impl AsRef<Path>, out: &mut FlexStr<'_>) -> Result<()> {
    let bytes = std::fs::read(path)?;
    out.push_str(&bytes)
}

/// Write the whole string to the file at `path`, replacing its contents.
pub fn write_file(path: impl AsRef<Path>, value: &FlexStr<'_>) -> Result<()> {
    std::fs::write(path, value.as_bytes())?;
    Ok(())
}
