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
//! The seekable archive reader.

use crate::backend::{read_exact, Backend, MemSource};
use crate::error::{Result, TarError};
use crate::header::{RawHeader, TarHeader};
use crate::BLOCKSIZE;
use log::trace;

#[cfg(feature = "std")]
use crate::backend::FileBackend;

/// Position of the record whose header was read last. Kept so the
/// payload can be addressed and the cursor advanced without re-parsing.
#[derive(Debug, Clone, Copy)]
struct Record {
    header_offset: u64,
    size: u64,
    data_read: u64,
}

/// Reads an archive over any backend with `read` and `seek`.
///
/// The intended client pattern is `read_header`, then optionally
/// `read_data`, then `next`, repeated until `read_header` reports
/// [`TarError::NullRecord`]:
///
/// ```
/// use picotar::{TarError, TarReader, TarWriter};
///
/// # let mut writer = TarWriter::in_memory();
/// # writer.write_file_header("a.txt", 2).unwrap();
/// # writer.write_data(b"hi").unwrap();
/// # writer.finalize().unwrap();
/// # let archive = writer.into_inner().into_vec();
/// let mut reader = TarReader::from_slice(&archive);
/// loop {
///     match reader.read_header() {
///         Ok(_header) => {
///             // payload reads would go here
///             reader.next().unwrap();
///         }
///         Err(TarError::NullRecord) => break,
///         Err(other) => panic!("corrupt archive: {other}"),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct TarReader<B> {
    backend: B,
    /// Byte offset of the record the cursor currently rests on.
    pos: u64,
    record: Option<Record>,
}

impl<'a> TarReader<MemSource<'a>> {
    /// Reads an archive from caller-owned bytes without copying them.
    #[must_use]
    pub const fn from_slice(data: &'a [u8]) -> Self {
        Self::new(MemSource::new(data))
    }
}

#[cfg(feature = "std")]
impl TarReader<FileBackend> {
    /// Opens an archive file read-only.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileBackend::open(path)?))
    }
}

impl<B: Backend> TarReader<B> {
    /// Wraps a backend. The backend only needs `read` and `seek`.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            pos: 0,
            record: None,
        }
    }

    /// Decodes the header record at the cursor without advancing past it.
    /// Calling this twice in a row returns the same header.
    ///
    /// Returns [`TarError::NullRecord`] at the end-of-archive terminator.
    pub fn read_header(&mut self) -> Result<TarHeader> {
        self.backend.seek(self.pos)?;
        let mut block = [0; BLOCKSIZE];
        read_exact(&mut self.backend, &mut block)?;
        let header = RawHeader::from_block(&block).decode()?;
        self.record = Some(Record {
            header_offset: self.pos,
            size: header.size,
            data_read: 0,
        });
        Ok(header)
    }

    /// Copies the next `out.len()` payload bytes of the current record.
    ///
    /// Requires a preceding `read_header`. Reading past the declared
    /// payload size fails with [`TarError::Overflow`] rather than
    /// crossing into the following record.
    pub fn read_data(&mut self, out: &mut [u8]) -> Result<()> {
        let record = self.record.as_mut().ok_or(TarError::Failure)?;
        let wanted = out.len() as u64;
        if record.data_read + wanted > record.size {
            return Err(TarError::Overflow);
        }
        self.backend
            .seek(record.header_offset + BLOCKSIZE as u64 + record.data_read)?;
        read_exact(&mut self.backend, out)?;
        record.data_read += wanted;
        Ok(())
    }

    /// Advances the cursor past the current record: one header block plus
    /// the payload rounded up to the block size.
    pub fn next(&mut self) -> Result<()> {
        let record = self.record.take().ok_or(TarError::Failure)?;
        let occupied = record
            .size
            .checked_next_multiple_of(BLOCKSIZE as u64)
            .ok_or(TarError::Overflow)?;
        self.pos = record.header_offset + BLOCKSIZE as u64 + occupied;
        Ok(())
    }

    /// Rewinds to the archive origin and scans for a record whose name
    /// equals `name` byte for byte. On a match the cursor stays on that
    /// record, so `read_data` serves its payload.
    pub fn find(&mut self, name: &str) -> Result<TarHeader> {
        self.rewind()?;
        loop {
            match self.read_header() {
                Ok(header) => {
                    if header.name.as_bytes() == name.as_bytes() {
                        return Ok(header);
                    }
                    trace!("skipping {:?} while looking for {name}", header.name);
                    self.next()?;
                }
                Err(TarError::NullRecord) => return Err(TarError::NotFound),
                Err(err) => return Err(err),
            }
        }
    }

    /// Moves the cursor back to the archive origin and drops the cached
    /// record state.
    pub fn rewind(&mut self) -> Result<()> {
        self.backend.seek(0)?;
        self.pos = 0;
        self.record = None;
        Ok(())
    }

    /// Releases the handle and hands the backend back.
    pub fn into_inner(self) -> B {
        self.backend
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::writer::TarWriter;

    /// Two small files, the second spanning two payload blocks.
    fn sample_archive() -> std::vec::Vec<u8> {
        let mut writer = TarWriter::in_memory();
        writer.write_file_header("test1.txt", 11).unwrap();
        writer.write_data(b"Hello world").unwrap();
        writer.write_file_header("large.bin", 513).unwrap();
        writer.write_data(&[0xAB; 513]).unwrap();
        writer.finalize().unwrap();
        writer.into_inner().into_vec()
    }

    #[test]
    fn test_header_iteration() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);

        let first = reader.read_header().unwrap();
        assert_eq!(first.name.as_str(), Ok("test1.txt"));
        assert_eq!(first.size, 11);
        reader.next().unwrap();

        let second = reader.read_header().unwrap();
        assert_eq!(second.name.as_str(), Ok("large.bin"));
        assert_eq!(second.size, 513);
        reader.next().unwrap();

        assert_eq!(reader.read_header(), Err(TarError::NullRecord));
    }

    #[test]
    fn test_read_header_is_reentrant() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);

        let once = reader.read_header().unwrap();
        let twice = reader.read_header().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_incremental_payload_reads() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);
        reader.read_header().unwrap();

        let mut hello = [0u8; 5];
        reader.read_data(&mut hello).unwrap();
        assert_eq!(&hello, b"Hello");
        let mut world = [0u8; 6];
        reader.read_data(&mut world).unwrap();
        assert_eq!(&world, b" world");

        // the declared payload is exhausted now
        let mut more = [0u8; 1];
        assert_eq!(reader.read_data(&mut more), Err(TarError::Overflow));
    }

    #[test]
    fn test_next_skips_unread_payload() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);
        reader.read_header().unwrap();
        reader.next().unwrap();
        assert_eq!(reader.read_header().unwrap().name.as_str(), Ok("large.bin"));
    }

    #[test]
    fn test_find_positions_for_payload() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);

        let header = reader.find("large.bin").unwrap();
        assert_eq!(header.size, 513);
        let mut payload = [0u8; 513];
        reader.read_data(&mut payload).unwrap();
        assert!(payload.iter().all(|byte| *byte == 0xAB));

        // lookup rewinds, so earlier entries are found afterwards too
        let header = reader.find("test1.txt").unwrap();
        assert_eq!(header.size, 11);

        assert_eq!(reader.find("missing.txt"), Err(TarError::NotFound));
    }

    #[test]
    fn test_payload_access_requires_header() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);
        let mut buf = [0u8; 1];
        assert_eq!(reader.read_data(&mut buf), Err(TarError::Failure));
        assert_eq!(reader.next(), Err(TarError::Failure));
    }

    #[test]
    fn test_corrupt_checksum_is_reported() {
        let mut archive = sample_archive();
        archive[148] ^= 0x01;
        let mut reader = TarReader::from_slice(&archive);
        assert!(matches!(
            reader.read_header(),
            Err(TarError::BadChecksum { .. })
        ));
    }

    #[test]
    fn test_rewind_restarts_iteration() {
        let archive = sample_archive();
        let mut reader = TarReader::from_slice(&archive);
        reader.read_header().unwrap();
        reader.next().unwrap();
        reader.rewind().unwrap();
        assert_eq!(reader.read_header().unwrap().name.as_str(), Ok("test1.txt"));
    }

    #[test]
    fn test_gnu_tar_v7_fixture() {
        let archive = include_bytes!("../tests/gnu_tar_v7.tar");
        let mut reader = TarReader::from_slice(archive);

        let first = reader.read_header().unwrap();
        assert_eq!(first.name.as_str(), Ok("hello_world.txt"));
        assert_eq!(first.size, 12);
        assert_eq!(first.mode, 0o644);
        assert_eq!(first.mtime, 1_700_000_000);
        assert!(first.typeflag.is_regular_file());
        let mut content = [0u8; 12];
        reader.read_data(&mut content).unwrap();
        assert_eq!(&content, b"Hello World\n");
        reader.next().unwrap();

        let second = reader.read_header().unwrap();
        assert_eq!(second.name.as_str(), Ok("payload_513b.txt"));
        assert_eq!(second.size, 513);
        reader.next().unwrap();

        assert_eq!(reader.read_header(), Err(TarError::NullRecord));
    }

    #[test]
    fn test_gnu_tar_ustar_fixture() {
        // ustar headers differ only in the reserved area, which the
        // decoder ignores but the checksum still covers
        let archive = include_bytes!("../tests/gnu_tar_ustar.tar");
        let mut reader = TarReader::from_slice(archive);
        let header = reader.find("payload_513b.txt").unwrap();
        assert_eq!(header.size, 513);
        let mut content = [0u8; 513];
        reader.read_data(&mut content).unwrap();
        assert!(content.starts_with(b"0123456789"));
        assert_eq!(content[512], b'\n');
    }

    #[test]
    fn test_truncated_archive_fails_cleanly() {
        let archive = sample_archive();
        // cut into the second record's header block
        let mut reader = TarReader::from_slice(&archive[..1100]);
        reader.read_header().unwrap();
        reader.next().unwrap();
        assert_eq!(reader.read_header(), Err(TarError::ReadFailed));
    }
}
