use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::parser::ZipParser;
use super::structures::{ArchiveEntry, CompressionMethod};

/// Reads entries out of a ZIP archive held by any [`ReadAt`] source.
pub struct ArchiveReader<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ArchiveReader<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive.
    ///
    /// An error here means the archive itself is unreadable.
    pub async fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        self.parser.list_files().await
    }

    /// Decompress one entry into memory and verify its CRC-32.
    pub async fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        if entry.is_directory() {
            bail!("{} is a directory", entry.name);
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        match data_offset.checked_add(entry.compressed_size) {
            Some(end) if end <= self.parser.size() => {}
            _ => bail!("compressed data runs past the end of the archive"),
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_at(data_offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => inflate(&raw, entry.uncompressed_size)?,
            CompressionMethod::Unknown(method) => bail!(
                "Unsupported compression method: {} (only STORED and DEFLATE are supported)",
                method
            ),
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "size mismatch: expected {} bytes, got {}",
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!(
                "checksum mismatch: expected {:08x}, got {:08x}",
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }
}

/// Inflate a raw DEFLATE stream, reading at most one byte past the declared size
/// so an oversized stream shows up as a size mismatch instead of unbounded growth.
fn inflate(raw: &[u8], uncompressed_size: u64) -> Result<Vec<u8>> {
    let capacity = uncompressed_size.min(raw.len() as u64 * 64) as usize;
    let mut out = Vec::with_capacity(capacity);
    DeflateDecoder::new(raw)
        .take(uncompressed_size.saturating_add(1))
        .read_to_end(&mut out)?;
    Ok(out)
}
