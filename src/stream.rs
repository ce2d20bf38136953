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
//! The linear decoder: archive parsing without backward seeking.
//!
//! Byte chunks of arbitrary size are pushed in; headers and payload are
//! pulled out. Only header bytes are staged in the fixed 512-byte
//! scratch area. Payload is copied straight from the caller's chunk to
//! the caller's output buffer, so the per-decoder footprint stays at one
//! block no matter how data arrives.

use crate::error::{Result, TarError};
use crate::header::{RawHeader, TarHeader};
use crate::BLOCKSIZE;
use log::debug;

/// Cross-feed position within the record structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Collecting header bytes into the scratch block.
    NeedHeader,
    /// A header is decoded; `remaining` payload bytes and then `pad`
    /// zero-fill bytes are owed before the next header.
    HavePayload { remaining: u64, pad: u64 },
    /// The terminator was seen. Further input is ignored.
    End,
}

/// Push-based archive decoder for non-seekable transports.
///
/// Hand each arriving chunk to [`LinearDecoder::feed`] and drain the
/// returned [`Feed`] before the next chunk arrives:
///
/// ```
/// use picotar::{LinearDecoder, TarError};
///
/// # let mut writer = picotar::TarWriter::in_memory();
/// # writer.write_file_header("chunk.txt", 3).unwrap();
/// # writer.write_data(b"abc").unwrap();
/// # writer.finalize().unwrap();
/// # let archive = writer.into_inner().into_vec();
/// let mut decoder = LinearDecoder::new();
/// let mut contents = Vec::new();
/// 'chunks: for chunk in archive.chunks(7) {
///     let mut feed = decoder.feed(chunk);
///     loop {
///         // payload of the open record comes first
///         let mut buf = [0u8; 64];
///         loop {
///             let n = feed.read_data(&mut buf);
///             if n == 0 {
///                 break;
///             }
///             contents.extend_from_slice(&buf[..n]);
///         }
///         match feed.read_header() {
///             Ok(Some(_header)) => {} // the next record starts here
///             Ok(None) => continue 'chunks, // chunk exhausted
///             Err(TarError::NullRecord) => break 'chunks,
///             Err(other) => panic!("corrupt archive: {other}"),
///         }
///     }
/// }
/// assert_eq!(contents, b"abc");
/// ```
#[derive(Debug)]
pub struct LinearDecoder {
    /// Staging area for one header block.
    scratch: [u8; BLOCKSIZE],
    /// Header bytes collected in `scratch` so far.
    held: usize,
    state: DecodeState,
}

impl Default for LinearDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scratch: [0; BLOCKSIZE],
            held: 0,
            state: DecodeState::NeedHeader,
        }
    }

    /// Makes `chunk` the current input window and returns the access
    /// guard for it.
    ///
    /// The previous window must have been consumed (its
    /// [`Feed::available`] reached zero); bytes left behind in a dropped
    /// guard are not retained.
    pub fn feed<'d>(&mut self, chunk: &'d [u8]) -> Feed<'_, 'd> {
        Feed {
            decoder: self,
            window: chunk,
        }
    }

    /// Payload bytes of the current record not yet pulled with
    /// [`Feed::read_data`].
    #[must_use]
    pub const fn data_remaining(&self) -> u64 {
        match self.state {
            DecodeState::HavePayload { remaining, .. } => remaining,
            DecodeState::NeedHeader | DecodeState::End => 0,
        }
    }

    /// True once the end-of-archive terminator has been seen.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, DecodeState::End)
    }
}

/// Borrow of a [`LinearDecoder`] together with the chunk currently being
/// consumed. All decoding happens through this guard; the borrow ties
/// the validity of the chunk to its use.
#[derive(Debug)]
pub struct Feed<'a, 'd> {
    decoder: &'a mut LinearDecoder,
    window: &'d [u8],
}

impl Feed<'_, '_> {
    /// Advances to the next header.
    ///
    /// Unread payload and padding of the current record are discarded
    /// first, which makes this the linear equivalent of the seekable
    /// reader's skip-ahead. Returns `Ok(None)` when the window runs out
    /// before a full header block is collected; feed the next chunk and
    /// call again. Returns [`TarError::NullRecord`] once the terminator
    /// is reached, on this and every later call.
    pub fn read_header(&mut self) -> Result<Option<TarHeader>> {
        loop {
            match self.decoder.state {
                DecodeState::End => {
                    self.window = &[];
                    return Err(TarError::NullRecord);
                }
                DecodeState::HavePayload { .. } => {
                    if !self.skip_current_record() {
                        return Ok(None);
                    }
                }
                DecodeState::NeedHeader => {
                    let take = (BLOCKSIZE - self.decoder.held).min(self.window.len());
                    let staged = self.decoder.held + take;
                    self.decoder.scratch[self.decoder.held..staged]
                        .copy_from_slice(&self.window[..take]);
                    self.decoder.held = staged;
                    self.window = &self.window[take..];
                    if staged < BLOCKSIZE {
                        return Ok(None);
                    }
                    self.decoder.held = 0;
                    return self.decode_staged_header().map(Some);
                }
            }
        }
    }

    /// Pulls payload bytes of the current record into `out`, returning
    /// the number copied. Copies at most `out.len()`, at most the payload
    /// bytes still owed, and at most what the window holds. When the
    /// payload completes, the trailing padding is consumed silently, even
    /// when it spans later feeds.
    ///
    /// Returns zero whenever there is nothing to copy; that means "feed
    /// more data" while [`LinearDecoder::data_remaining`] is non-zero and
    /// "record finished" otherwise.
    pub fn read_data(&mut self, out: &mut [u8]) -> usize {
        let DecodeState::HavePayload { remaining, pad } = &mut self.decoder.state else {
            if self.decoder.is_finished() {
                self.window = &[];
            }
            return 0;
        };
        let n = (out.len() as u64)
            .min(*remaining)
            .min(self.window.len() as u64) as usize;
        out[..n].copy_from_slice(&self.window[..n]);
        self.window = &self.window[n..];
        *remaining -= n as u64;
        if *remaining == 0 {
            let drained = (*pad).min(self.window.len() as u64);
            self.window = &self.window[drained as usize..];
            *pad -= drained;
            if *pad == 0 {
                self.decoder.state = DecodeState::NeedHeader;
            }
        }
        n
    }

    /// Window bytes not consumed yet.
    #[must_use]
    pub const fn available(&self) -> usize {
        self.window.len()
    }

    /// Payload bytes of the current record not yet pulled. See
    /// [`LinearDecoder::data_remaining`].
    #[must_use]
    pub const fn data_remaining(&self) -> u64 {
        self.decoder.data_remaining()
    }

    /// Discards unread payload and padding from the window. True once the
    /// whole record is behind us.
    fn skip_current_record(&mut self) -> bool {
        let DecodeState::HavePayload { remaining, pad } = &mut self.decoder.state else {
            return true;
        };
        let owed = *remaining + *pad;
        let drained = owed.min(self.window.len() as u64);
        self.window = &self.window[drained as usize..];
        let still_owed = owed - drained;
        if still_owed == 0 {
            self.decoder.state = DecodeState::NeedHeader;
            return true;
        }
        // keep the split between payload and pad for data_remaining()
        *remaining = still_owed.saturating_sub(*pad).min(*remaining);
        *pad = still_owed - *remaining;
        false
    }

    fn decode_staged_header(&mut self) -> Result<TarHeader> {
        let raw = RawHeader::from_block(&self.decoder.scratch);
        if raw.is_zero_block() {
            debug!("null record, linear stream finished");
            self.decoder.state = DecodeState::End;
            self.window = &[];
            return Err(TarError::NullRecord);
        }
        let header = raw.decode()?;
        let pad = header.padding();
        if header.size > 0 {
            self.decoder.state = DecodeState::HavePayload {
                remaining: header.size,
                pad,
            };
        }
        Ok(header)
    }
}
