//! Archive sources.
//!
//! The ZIP reader works against anything implementing [`ReadAt`]. Downloaded
//! archives are held in memory by [`MemoryReader`]; archives on disk are read
//! in place by [`LocalFileReader`].

mod http;
mod local;
mod memory;

pub use http::HttpFetcher;
pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails if the source holds fewer than `offset + buf.len()` bytes.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Check that `len` bytes at `offset` fit inside a source of `size` bytes.
pub(crate) fn check_bounds(offset: u64, len: usize, size: u64) -> Result<()> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(()),
        _ => anyhow::bail!(
            "read of {} bytes at offset {} is past the end of the archive ({} bytes)",
            len,
            offset,
            size
        ),
    }
}
