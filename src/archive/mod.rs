//! ZIP archive parsing and extraction.
//!
//! - [`structures`]: data structures for ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: low-level parsing of ZIP structures through [`ReadAt`](crate::io::ReadAt)
//! - [`reader`]: entry listing and in-memory decompression
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - CRC-32 verification of every extracted entry
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod parser;
mod reader;
mod structures;

pub use parser::ZipParser;
pub use reader::ArchiveReader;
pub use structures::*;
