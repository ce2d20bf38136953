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
//! The 512-byte Tar record codec. Follows the pre-POSIX ("v7") header
//! layout as described in
//! <https://www.gnu.org/software/tar/manual/html_node/Standard.html>;
//! the ustar area past offset 257 is zero-filled on write and ignored
//! on read, so archives in any of the common flavors decode as long as
//! their checksum holds.

use crate::error::{Result, TarError};
use crate::tar_format_types::{TarFormatOctal, TarFormatString};
use crate::{BLOCKSIZE, NAME_LEN};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Byte range of the checksum field inside a record.
const CHECKSUM_RANGE: core::ops::Range<usize> = 148..156;

/// Largest payload size encodable in the 12-byte octal size field
/// (eleven octal digits, 8 GiB minus one byte).
pub const MAX_PAYLOAD_SIZE: u64 = 0o77777777777;

/// A raw 512-byte archive record, reinterpreted field by field.
///
/// Each file is started by such a header, which describes the size and
/// the file name. After that, the file content follows in blocks of 512
/// bytes, the last one zero-padded.
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawHeader {
    /// File name. There is always a NUL byte, therefore the max len is 99.
    pub name: TarFormatString<NAME_LEN>,
    pub mode: TarFormatOctal<8>,
    pub uid: TarFormatOctal<8>,
    pub gid: TarFormatOctal<8>,
    /// Payload byte count, stored as octal ASCII.
    pub size: TarFormatOctal<12>,
    /// Modification time in seconds since the epoch.
    pub mtime: TarFormatOctal<12>,
    pub cksum: TarFormatOctal<8>,
    pub typeflag: u8,
    /// Link target. There is always a NUL byte, therefore the max len is 99.
    pub linkname: TarFormatString<NAME_LEN>,
    /// The ustar/GNU extension area. Zero-filled on write, ignored on read.
    pub reserved: [u8; 255],
}

impl RawHeader {
    /// Reinterprets a 512-byte block as a record.
    #[must_use]
    pub fn from_block(block: &[u8; BLOCKSIZE]) -> &Self {
        Self::ref_from_bytes(block).expect("size is correct")
    }

    /// An archive is terminated by two 512-byte blocks of zero bytes. The
    /// decoder stops at the first one.
    #[must_use]
    pub fn is_zero_block(&self) -> bool {
        self.as_bytes().iter().all(|byte| *byte == 0)
    }

    /// Unsigned byte sum over the record with the checksum field counted
    /// as eight ASCII spaces.
    #[must_use]
    pub fn compute_checksum(&self) -> u32 {
        self.as_bytes()
            .iter()
            .enumerate()
            .map(|(i, byte)| {
                if CHECKSUM_RANGE.contains(&i) {
                    u32::from(b' ')
                } else {
                    u32::from(*byte)
                }
            })
            .sum()
    }

    /// Compares the stored checksum against the computed one.
    pub fn verify_checksum(&self) -> Result<()> {
        let stored = self.cksum.as_number::<u32>().ok_or(TarError::BadOctal)?;
        let computed = self.compute_checksum();
        if stored == computed {
            Ok(())
        } else {
            Err(TarError::BadChecksum { stored, computed })
        }
    }

    /// Decodes the record into its logical form.
    ///
    /// An all-zero record decodes to [`TarError::NullRecord`], the normal
    /// end-of-archive indicator. A checksum mismatch is fatal for the
    /// record; no resynchronization is attempted.
    pub fn decode(&self) -> Result<TarHeader> {
        if self.is_zero_block() {
            return Err(TarError::NullRecord);
        }
        self.verify_checksum()?;
        Ok(TarHeader {
            name: self.name,
            mode: self.mode.as_number().ok_or(TarError::BadOctal)?,
            uid: self.uid.as_number().ok_or(TarError::BadOctal)?,
            gid: self.gid.as_number().ok_or(TarError::BadOctal)?,
            size: self.size.as_number().ok_or(TarError::BadOctal)?,
            mtime: self.mtime.as_number().ok_or(TarError::BadOctal)?,
            typeflag: TypeFlag::from_byte(self.typeflag),
            linkname: self.linkname,
        })
    }

    /// Writes the checksum field in the classic POSIX form: six octal
    /// digits, a NUL byte, a space.
    fn fill_checksum(&mut self, sum: u32) {
        let field = self.cksum.as_mut_bytes();
        let mut rest = sum;
        for slot in field[..6].iter_mut().rev() {
            *slot = b'0' + (rest & 0o7) as u8;
            rest >>= 3;
        }
        field[6] = 0;
        field[7] = b' ';
    }
}

/// The decoded form of a [`RawHeader`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TarHeader {
    pub name: TarFormatString<NAME_LEN>,
    /// UNIX permission bits. A zero mode encodes as `0o664`.
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    /// Payload byte count.
    pub size: u64,
    /// Modification time in seconds since the epoch.
    pub mtime: u64,
    pub typeflag: TypeFlag,
    pub linkname: TarFormatString<NAME_LEN>,
}

impl TarHeader {
    /// A regular-file header with the given name and payload size.
    ///
    /// Fails with [`TarError::Overflow`] if the name is longer than 99
    /// bytes or the size does not fit eleven octal digits.
    pub fn file(name: &str, size: u64) -> Result<Self> {
        if size > MAX_PAYLOAD_SIZE {
            return Err(TarError::Overflow);
        }
        Ok(Self {
            name: TarFormatString::try_from_bytes(name.as_bytes()).ok_or(TarError::Overflow)?,
            mode: 0,
            uid: 0,
            gid: 0,
            size,
            mtime: 0,
            typeflag: TypeFlag::Regular,
            linkname: TarFormatString::new([0; NAME_LEN]),
        })
    }

    /// A directory header. Directories carry no payload.
    pub fn directory(name: &str) -> Result<Self> {
        let mut header = Self::file(name, 0)?;
        header.typeflag = TypeFlag::Directory;
        Ok(header)
    }

    /// The permission bits as typed flags, or `None` if the mode holds
    /// bits outside the known set.
    #[must_use]
    pub fn mode_flags(&self) -> Option<ModeFlags> {
        ModeFlags::from_bits(self.mode)
    }

    /// Number of 512-byte blocks occupied by the payload.
    #[must_use]
    pub fn payload_block_count(&self) -> u64 {
        self.size.div_ceil(BLOCKSIZE as u64)
    }

    /// Zero bytes following the payload up to the next block boundary.
    #[must_use]
    pub fn padding(&self) -> u64 {
        self.payload_block_count() * BLOCKSIZE as u64 - self.size
    }

    /// Encodes the header into a wire record.
    ///
    /// The mode defaults to `0o664` and the modification time to zero
    /// when left at their zero values. Fails with [`TarError::Overflow`]
    /// if a name or number does not fit its field.
    pub fn encode(&self) -> Result<RawHeader> {
        let mut raw = RawHeader::new_zeroed();
        raw.name =
            TarFormatString::try_from_bytes(self.name.as_bytes()).ok_or(TarError::Overflow)?;
        let mode = if self.mode == 0 { 0o664 } else { self.mode };
        if !raw.mode.set(u64::from(mode)) {
            return Err(TarError::Overflow);
        }
        if !raw.uid.set(self.uid) || !raw.gid.set(self.gid) {
            return Err(TarError::Overflow);
        }
        if !raw.size.set(self.size) || !raw.mtime.set(self.mtime) {
            return Err(TarError::Overflow);
        }
        raw.typeflag = self.typeflag.to_byte();
        raw.linkname =
            TarFormatString::try_from_bytes(self.linkname.as_bytes()).ok_or(TarError::Overflow)?;
        raw.fill_checksum(raw.compute_checksum());
        Ok(raw)
    }
}

/// Describes the kind of payload that follows a header. Unknown flags
/// are carried verbatim and not interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeFlag {
    /// A regular file, `'0'`. Old archives mark regular files with an
    /// ASCII NUL instead; both decode to this variant.
    Regular,
    /// A hard link to a previously archived file, `'1'`. The target is in
    /// the linkname field.
    HardLink,
    /// A symbolic link, `'2'`. The target is in the linkname field.
    Symlink,
    /// A character device, `'3'`.
    CharDevice,
    /// A block device, `'4'`.
    BlockDevice,
    /// A directory, `'5'`.
    Directory,
    /// A FIFO special file, `'6'`.
    Fifo,
    /// A contiguous file, `'7'`. Treated like a regular file on systems
    /// without contiguous allocation.
    Contiguous,
    /// Any other flag byte, surfaced as is.
    Other(u8),
}

impl TypeFlag {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => Self::Regular,
            b'1' => Self::HardLink,
            b'2' => Self::Symlink,
            b'3' => Self::CharDevice,
            b'4' => Self::BlockDevice,
            b'5' => Self::Directory,
            b'6' => Self::Fifo,
            b'7' => Self::Contiguous,
            other => Self::Other(other),
        }
    }

    /// The wire byte. `Regular` encodes as `'0'`, not NUL.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Regular => b'0',
            Self::HardLink => b'1',
            Self::Symlink => b'2',
            Self::CharDevice => b'3',
            Self::BlockDevice => b'4',
            Self::Directory => b'5',
            Self::Fifo => b'6',
            Self::Contiguous => b'7',
            Self::Other(byte) => byte,
        }
    }

    #[must_use]
    pub const fn is_regular_file(self) -> bool {
        matches!(self, Self::Regular | Self::Contiguous)
    }

    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

bitflags::bitflags! {
    /// UNIX file permissions in octal format.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u32 {
        /// Set UID on execution.
        const SetUID = 0o4000;
        /// Set GID on execution.
        const SetGID = 0o2000;
        /// Sticky bit.
        const TSVTX = 0o1000;
        /// Owner read.
        const OwnerRead = 0o400;
        /// Owner write.
        const OwnerWrite = 0o200;
        /// Owner execute.
        const OwnerExec = 0o100;
        /// Group read.
        const GroupRead = 0o040;
        /// Group write.
        const GroupWrite = 0o020;
        /// Group execute.
        const GroupExec = 0o010;
        /// Others read.
        const OthersRead = 0o004;
        /// Others write.
        const OthersWrite = 0o002;
        /// Others execute.
        const OthersExec = 0o001;
    }
}
