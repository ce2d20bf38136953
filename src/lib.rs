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
//! # `picotar` - Read and Write Tar Archives (Tarballs)
//!
//! _Due to historical reasons, there are several formats of Tar archives.
//! All of them are based on the same principles, but have some subtle
//! differences that often make them incompatible with each other._
//! [(reference)](https://www.gnu.org/software/tar/manual/html_section/Formats.html)
//!
//! Library to read and write Tar archives in `no_std` environments with
//! zero allocations outside the explicit in-memory writer mode. If you
//! have a standard environment and need full feature support, I recommend
//! the use of <https://crates.io/crates/tar> instead.
//!
//! ## TL;DR
//!
//! Look at [`TarReader`] (seekable reading), [`LinearDecoder`]
//! (non-seekable, chunk-fed reading), and [`TarWriter`] (writing).
//!
//! ## Limitations
//!
//! This crate focuses on the pre-POSIX ("v7") record layout plus the
//! type flags shared with ustar and old GNU archives. Archives written
//! here carry no `ustar` magic and are readable by standard tar
//! implementations in their old/v7 mode. GNU extensions such as sparse
//! files, incremental archives, and the long filename extension are not
//! supported; unknown type flags are surfaced verbatim. The maximum name
//! length is 99 characters excluding the NUL byte, the maximum payload
//! size is 8 GiB minus one byte.
//!
//! ## Use Case
//!
//! This library is useful if you write a kernel, a bootloader, or a
//! similar low-level application which needs to pack or unpack "a bunch
//! of files" without pulling in an archiving utility. It owns no
//! threads, does no compression, and its linear mode parses archives
//! arriving in arbitrary chunk sizes with a fixed 512-byte footprint.
//!
//! ## Example
//!
//! ```rust
//! use picotar::{TarReader, TarWriter};
//!
//! // init a logger (optional)
//! env_logger::init();
//!
//! let mut writer = TarWriter::in_memory();
//! writer.write_file_header("hello.txt", 12).unwrap();
//! writer.write_data(b"Hello World\n").unwrap();
//! writer.finalize().unwrap();
//! let archive = writer.into_inner().into_vec();
//!
//! // also works in no_std environments with caller-provided bytes
//! let mut reader = TarReader::from_slice(&archive);
//! let header = reader.find("hello.txt").unwrap();
//! let mut content = [0u8; 12];
//! reader.read_data(&mut content).unwrap();
//! assert_eq!(&content, b"Hello World\n");
//! ```
//!
//! ## Cargo Features
//!
//! - `alloc` enables the growable in-memory writer backend
//!   ([`MemBuffer`], [`TarWriter::in_memory`]).
//! - `std` (default, implies `alloc`) enables the file backend
//!   ([`FileBackend`], [`TarReader::open`], [`TarWriter::create`]).
//!
//! Neither feature is needed for reading from slices, linear decoding,
//! or streaming emission through a sink callback.
//!
//! ## MSRV
//!
//! The MSRV is 1.81.0 stable.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::missing_const_for_fn
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

#[cfg_attr(test, macro_use)]
#[cfg(test)]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

/// Each archive record (header or payload block) is 512 bytes.
pub const BLOCKSIZE: usize = 512;
/// Width of the name and linkname fields, terminating NUL byte included.
pub const NAME_LEN: usize = 100;

mod backend;
mod error;
mod header;
mod reader;
mod stream;
mod tar_format_types;
mod writer;

pub use backend::*;
pub use error::*;
pub use header::*;
pub use reader::*;
pub use stream::*;
pub use tar_format_types::*;
pub use writer::*;
