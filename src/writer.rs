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
//! The archive writer.

use crate::backend::{write_all, Backend, SinkBackend};
use crate::error::{Result, TarError};
use crate::header::TarHeader;
use crate::BLOCKSIZE;
use log::warn;

#[cfg(feature = "alloc")]
use crate::backend::MemBuffer;
#[cfg(feature = "std")]
use crate::backend::FileBackend;

const ZERO_BLOCK: [u8; BLOCKSIZE] = [0; BLOCKSIZE];

/// Payload bookkeeping between a header and its last data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Between records. Headers and the terminator may be written.
    Idle,
    /// A header has been written and `remaining` payload bytes are owed.
    Payload { remaining: u64 },
}

/// Emits archive records over any backend with `write`.
///
/// Every record is written through the same sequence: a header, the
/// declared number of payload bytes in as many `write_data` calls as
/// convenient, zero-padding up to the block boundary (emitted
/// automatically when the payload completes), and finally the two-block
/// terminator from [`TarWriter::finalize`]. An archive without the
/// terminator is invalid.
///
/// ```
/// use picotar::TarWriter;
///
/// let mut writer = TarWriter::in_memory();
/// writer.write_file_header("greeting.txt", 5).unwrap();
/// writer.write_data(b"hello").unwrap();
/// writer.finalize().unwrap();
/// let archive = writer.into_inner().into_vec();
/// assert_eq!(archive.len(), 512 + 512 + 1024);
/// ```
#[derive(Debug)]
pub struct TarWriter<B> {
    backend: B,
    /// Bytes emitted so far. The padding and terminator alignment
    /// reference.
    written: u64,
    state: WriterState,
}

#[cfg(feature = "alloc")]
impl TarWriter<MemBuffer> {
    /// Writes the archive into a growable in-memory buffer. Retrieve the
    /// bytes after `finalize` via
    /// [`into_inner`](TarWriter::into_inner) and
    /// [`MemBuffer::into_vec`], or [`MemBuffer::take`].
    #[must_use]
    pub const fn in_memory() -> Self {
        Self::new(MemBuffer::new())
    }
}

#[cfg(feature = "std")]
impl TarWriter<FileBackend> {
    /// Creates an archive file, truncating any existing one.
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileBackend::create(path)?))
    }
}

impl<F> TarWriter<SinkBackend<F>>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    /// Streams the archive through a callback, invoked on every emission.
    pub const fn streaming(sink: F) -> Self {
        Self::new(SinkBackend::new(sink))
    }
}

impl<B: Backend> TarWriter<B> {
    /// Wraps a backend. The backend only needs `write`.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            written: 0,
            state: WriterState::Idle,
        }
    }

    /// Writes a header record for `header`. Follow up with `write_data`
    /// calls totaling `header.size` bytes.
    pub fn write_header(&mut self, header: &TarHeader) -> Result<()> {
        if self.state != WriterState::Idle {
            return Err(TarError::Failure);
        }
        let raw = header.encode()?;
        write_all(&mut self.backend, zerocopy::IntoBytes::as_bytes(&raw))?;
        self.written += BLOCKSIZE as u64;
        if header.size > 0 {
            self.state = WriterState::Payload {
                remaining: header.size,
            };
        }
        Ok(())
    }

    /// Writes a regular-file header with default permissions.
    pub fn write_file_header(&mut self, name: &str, size: u64) -> Result<()> {
        self.write_header(&TarHeader::file(name, size)?)
    }

    /// Writes a directory header. No payload follows.
    pub fn write_dir_header(&mut self, name: &str) -> Result<()> {
        self.write_header(&TarHeader::directory(name)?)
    }

    /// Writes payload bytes for the most recent header. Once the declared
    /// size is reached, zero-padding up to the next block boundary is
    /// emitted and the record is complete.
    ///
    /// Writing more than declared fails with [`TarError::Overflow`].
    /// Writing less and moving on is not detected here; it leaves a
    /// truncated record behind (see [`TarWriter::finalize`]).
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        let WriterState::Payload { remaining } = &mut self.state else {
            return Err(TarError::Overflow);
        };
        if data.len() as u64 > *remaining {
            return Err(TarError::Overflow);
        }
        write_all(&mut self.backend, data)?;
        self.written += data.len() as u64;
        *remaining -= data.len() as u64;
        if *remaining == 0 {
            self.state = WriterState::Idle;
            self.pad_to_block_boundary()?;
        }
        Ok(())
    }

    /// Terminates the archive with two all-zero records. Required before
    /// the handle is dropped or the buffer is taken; an archive without
    /// the terminator is invalid.
    pub fn finalize(&mut self) -> Result<()> {
        if let WriterState::Payload { remaining } = self.state {
            warn!("finalizing with {remaining} declared payload bytes never written");
            self.state = WriterState::Idle;
        }
        write_all(&mut self.backend, &ZERO_BLOCK)?;
        write_all(&mut self.backend, &ZERO_BLOCK)?;
        self.written += 2 * BLOCKSIZE as u64;
        Ok(())
    }

    /// Bytes emitted since the writer was created, padding and terminator
    /// included.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Releases the handle and hands the backend back.
    pub fn into_inner(self) -> B {
        self.backend
    }

    fn pad_to_block_boundary(&mut self) -> Result<()> {
        let pad = (BLOCKSIZE as u64 - self.written % BLOCKSIZE as u64) % BLOCKSIZE as u64;
        if pad > 0 {
            write_all(&mut self.backend, &ZERO_BLOCK[..pad as usize])?;
            self.written += pad;
        }
        Ok(())
    }
}
