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
//! The error surface of the crate.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, TarError>;

/// Everything that can go wrong while reading or writing an archive.
///
/// [`TarError::NullRecord`] is special: it is raised when an all-zero
/// record is encountered, which is the normal end-of-archive indicator.
/// Callers iterating over headers match on it explicitly to detect the
/// terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TarError {
    /// The backend reported an unspecified failure, or an operation was
    /// invoked out of sequence (e.g. payload access without a header).
    #[error("backend failure or operation out of sequence")]
    Failure,
    /// The backend could not be acquired.
    #[error("could not open backend")]
    OpenFailed,
    /// The backend returned fewer bytes than requested, or failed to read.
    #[error("could not read from backend")]
    ReadFailed,
    /// The backend accepted fewer bytes than handed to it, or failed to write.
    #[error("could not write to backend")]
    WriteFailed,
    /// The backend could not reposition to the requested offset.
    #[error("could not seek backend")]
    SeekFailed,
    /// The header checksum does not match the sum of the record bytes.
    #[error("header checksum mismatch (stored {stored}, computed {computed})")]
    BadChecksum {
        /// Value decoded from the checksum field.
        stored: u32,
        /// Unsigned byte sum over the record.
        computed: u32,
    },
    /// A numeric header field holds something other than octal ASCII.
    #[error("invalid octal field in header")]
    BadOctal,
    /// An all-zero record was read. This terminates the archive.
    #[error("null record (end of archive)")]
    NullRecord,
    /// A name lookup exhausted the archive without a match.
    #[error("no entry with the requested name")]
    NotFound,
    /// A size or name does not fit its header field, or a payload access
    /// crossed the declared payload boundary.
    #[error("field or payload boundary exceeded")]
    Overflow,
    /// The memory backend failed to grow its buffer.
    #[error("memory backend allocation failed")]
    OutOfMemory,
}

impl TarError {
    /// Short ASCII name of the error kind, for terse diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::OpenFailed => "open failed",
            Self::ReadFailed => "read failed",
            Self::WriteFailed => "write failed",
            Self::SeekFailed => "seek failed",
            Self::BadChecksum { .. } => "bad checksum",
            Self::BadOctal => "bad octal",
            Self::NullRecord => "null record",
            Self::NotFound => "not found",
            Self::Overflow => "overflow",
            Self::OutOfMemory => "out of memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_covers_every_kind() {
        let kinds = [
            TarError::Failure,
            TarError::OpenFailed,
            TarError::ReadFailed,
            TarError::WriteFailed,
            TarError::SeekFailed,
            TarError::BadChecksum {
                stored: 0,
                computed: 1,
            },
            TarError::BadOctal,
            TarError::NullRecord,
            TarError::NotFound,
            TarError::Overflow,
            TarError::OutOfMemory,
        ];
        for kind in kinds {
            assert!(kind.name().is_ascii());
            assert!(!kind.name().is_empty());
        }
    }

    #[test]
    fn test_display_mentions_checksums() {
        let msg = std::format!(
            "{}",
            TarError::BadChecksum {
                stored: 0o755,
                computed: 0o644
            }
        );
        assert!(msg.contains("493"));
        assert!(msg.contains("420"));
    }
}
