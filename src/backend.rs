/*
MIT License

Copyright (c) 2026 The picotar developers

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
//! Byte substrates an archive handle can sit on.
//!
//! [`Backend`] is a capability set: every method has a failing default,
//! and each substrate overrides exactly the calls it supports. Reading
//! an archive needs `read` and `seek`, writing needs `write`; the linear
//! decoder needs no backend at all because data is pushed into it.
//! Custom substrates implement the trait and are handed to
//! [`TarReader::new`](crate::TarReader::new) or
//! [`TarWriter::new`](crate::TarWriter::new) directly.

use crate::error::{Result, TarError};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// The capability set of a byte substrate.
pub trait Backend {
    /// Reads up to `buf.len()` bytes at the current position, returning
    /// the number of bytes placed in `buf`. Zero means end of data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let _ = buf;
        Err(TarError::Failure)
    }

    /// Writes `data` at the current position, returning the number of
    /// bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let _ = data;
        Err(TarError::Failure)
    }

    /// Repositions to `pos` bytes from the start of the substrate.
    fn seek(&mut self, pos: u64) -> Result<()> {
        let _ = pos;
        Err(TarError::Failure)
    }
}

/// Fills `buf` completely, mapping a short transfer to
/// [`TarError::ReadFailed`].
pub(crate) fn read_exact<B: Backend>(backend: &mut B, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = backend.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(TarError::ReadFailed);
        }
        filled += n;
    }
    Ok(())
}

/// Writes all of `data`, mapping a stalled backend to
/// [`TarError::WriteFailed`].
pub(crate) fn write_all<B: Backend>(backend: &mut B, data: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < data.len() {
        let n = backend.write(&data[written..])?;
        if n == 0 {
            return Err(TarError::WriteFailed);
        }
        written += n;
    }
    Ok(())
}

/// Read-only view over caller-owned archive bytes with a cursor. The
/// bytes are not copied; the caller keeps the buffer alive for the life
/// of the handle.
#[derive(Debug)]
pub struct MemSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemSource<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl Backend for MemSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let rest = &self.data[self.pos..];
        let n = buf.len().min(rest.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        let pos = usize::try_from(pos).map_err(|_| TarError::SeekFailed)?;
        if pos > self.data.len() {
            return Err(TarError::SeekFailed);
        }
        self.pos = pos;
        Ok(())
    }
}

/// Write-only growable buffer. Appends only; growth is amortized
/// doubling with fallible reservation, so a failed allocation surfaces
/// as [`TarError::OutOfMemory`] instead of aborting.
///
/// After the archive is finalized, ownership of the accumulated bytes
/// transfers to the caller through [`MemBuffer::take`] or
/// [`MemBuffer::into_vec`].
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct MemBuffer {
    buf: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl MemBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Logical number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated archive bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Moves the accumulated bytes out, leaving the buffer empty. Makes
    /// the ownership transfer explicit so the bytes cannot be handed out
    /// twice.
    pub fn take(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.buf)
    }

    /// Consumes the backend and returns the accumulated bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(feature = "alloc")]
impl Backend for MemBuffer {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.buf
            .try_reserve(data.len())
            .map_err(|_| TarError::OutOfMemory)?;
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }
}

/// Write-only backend that forwards every emission to a callback. Used
/// for streaming archive creation without seekable storage.
pub struct SinkBackend<F> {
    sink: F,
}

impl<F> SinkBackend<F>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    pub const fn new(sink: F) -> Self {
        Self { sink }
    }
}

impl<F> core::fmt::Debug for SinkBackend<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SinkBackend").finish_non_exhaustive()
    }
}

impl<F> Backend for SinkBackend<F>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (self.sink)(data)?;
        Ok(data.len())
    }
}

/// Archive storage in a file on disk.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct FileBackend {
    file: std::fs::File,
}

#[cfg(feature = "std")]
impl FileBackend {
    /// Opens an existing archive read-only, positioned at the start.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|_| TarError::OpenFailed)?;
        Ok(Self { file })
    }

    /// Creates a fresh archive for writing, truncating any existing file.
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path).map_err(|_| TarError::OpenFailed)?;
        Ok(Self { file })
    }
}

#[cfg(feature = "std")]
impl Backend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        std::io::Read::read(&mut self.file, buf).map_err(|_| TarError::ReadFailed)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        std::io::Write::write_all(&mut self.file, data).map_err(|_| TarError::WriteFailed)?;
        Ok(data.len())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        std::io::Seek::seek(&mut self.file, std::io::SeekFrom::Start(pos))
            .map(|_| ())
            .map_err(|_| TarError::SeekFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_source_read_and_seek() {
        let data = *b"0123456789";
        let mut source = MemSource::new(&data);

        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf), Ok(4));
        assert_eq!(&buf, b"0123");

        source.seek(8).unwrap();
        assert_eq!(source.read(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"89");
        // at end of data
        assert_eq!(source.read(&mut buf), Ok(0));

        assert_eq!(source.seek(11), Err(TarError::SeekFailed));
        // a source cannot accept writes
        assert_eq!(source.write(b"x"), Err(TarError::Failure));
    }

    #[test]
    fn test_read_exact_reports_short_reads() {
        let data = *b"abc";
        let mut source = MemSource::new(&data);
        let mut buf = [0u8; 4];
        assert_eq!(
            read_exact(&mut source, &mut buf),
            Err(TarError::ReadFailed)
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_mem_buffer_accumulates_and_takes() {
        let mut buf = MemBuffer::new();
        assert!(buf.is_empty());
        write_all(&mut buf, b"hello ").unwrap();
        write_all(&mut buf, b"world").unwrap();
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.as_slice(), b"hello world");

        let owned = buf.take();
        assert_eq!(owned, b"hello world");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_sink_backend_forwards_and_propagates() {
        let mut collected = std::vec::Vec::new();
        let mut sink = SinkBackend::new(|chunk: &[u8]| {
            collected.extend_from_slice(chunk);
            Ok(())
        });
        write_all(&mut sink, b"record").unwrap();
        drop(sink);
        assert_eq!(collected, b"record");

        let mut failing = SinkBackend::new(|_: &[u8]| Err(TarError::WriteFailed));
        assert_eq!(write_all(&mut failing, b"x"), Err(TarError::WriteFailed));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_backend_round_trip() {
        let mut path = std::env::temp_dir();
        path.push("picotar-backend-test.bin");

        let mut writer = FileBackend::create(&path).unwrap();
        write_all(&mut writer, b"on disk").unwrap();
        drop(writer);

        let mut reader = FileBackend::open(&path).unwrap();
        let mut buf = [0u8; 7];
        read_exact(&mut reader, &mut buf).unwrap();
        assert_eq!(&buf, b"on disk");
        reader.seek(3).unwrap();
        let mut rest = [0u8; 4];
        read_exact(&mut reader, &mut rest).unwrap();
        assert_eq!(&rest, b"disk");

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            FileBackend::open(&path).map(|_| ()),
            Err(TarError::OpenFailed)
        );
    }
}
