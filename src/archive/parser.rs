//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//! 4. For extraction, read each file's Local File Header and data
//!
//! Any failure in steps 1-3 means the archive as a whole is unusable.
//! Step 4 failures only affect the one entry.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Low-level ZIP file parser.
///
/// Typically used through [`ArchiveReader`](super::ArchiveReader)
/// rather than directly.
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the simple case (no comment) and archives with
    /// comments by searching backwards for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in file).
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            bail!("not a valid zip file");
        }

        // Common case first: no comment, EOCD is the last 22 bytes
        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_at(offset, &mut buf).await?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        // Otherwise scan backwards through the largest possible comment
        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_at(search_start, &mut buf).await?;

        for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                // The comment length must account for every remaining byte
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(
                        &buf[i..i + EndOfCentralDirectory::SIZE],
                    )?;
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        bail!("not a valid zip file")
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD has saturated (0xFFFF / 0xFFFFFFFF) fields.
    pub async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        // The locator sits immediately before the regular EOCD
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .context("not a valid zip file: no room for ZIP64 locator")?;
        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        self.reader
            .read_at(locator_offset, &mut locator_buf)
            .await?;

        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        self.reader
            .read_at(locator.eocd64_offset, &mut eocd64_buf)
            .await?;

        Zip64EOCD::from_bytes(&eocd64_buf)
    }

    /// List every entry of the central directory, in directory order.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is invalid or cannot be read.
    pub async fn list_files(&self) -> Result<Vec<ArchiveEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        // Validate against the archive size before allocating anything
        match cd_offset.checked_add(cd_size) {
            Some(end) if end <= self.size => {}
            _ => bail!("not a valid zip file: central directory out of bounds"),
        }
        if total_entries.saturating_mul(CDFH_MIN_SIZE as u64) > cd_size {
            bail!("not a valid zip file: too many entries for central directory size");
        }

        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for index in 0..total_entries as usize {
            let entry = Self::parse_cdfh(&mut cursor, index)
                .with_context(|| format!("not a valid zip file: entry {}", index))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Parse a Central Directory File Header from a cursor.
    fn parse_cdfh(cursor: &mut Cursor<&[u8]>, index: usize) -> Result<ArchiveEntry> {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig)?;
        if sig != CDFH_SIGNATURE {
            bail!("Invalid Central Directory File Header");
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes)?;
        let name = String::from_utf8_lossy(&file_name_bytes).to_string();

        // ZIP64 extended information lives in extra field 0x0001
        let extra_field_end = cursor.position() + extra_field_length as u64;
        if extra_field_end > cursor.get_ref().len() as u64 {
            bail!("extra field runs past the central directory");
        }

        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>()?;
            let field_size = cursor.read_u16::<LittleEndian>()?;
            let field_end = (cursor.position() + field_size as u64).min(extra_field_end);

            if header_id == 0x0001 {
                // Present only for header fields saturated at 0xFFFFFFFF, in this order
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    compressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    lfh_offset = cursor.read_u64::<LittleEndian>()?;
                }
            }
            cursor.set_position(field_end);
        }

        cursor.set_position(extra_field_end + file_comment_length as u64);

        Ok(ArchiveEntry {
            index,
            name,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            lfh_offset,
        })
    }

    /// Get the offset where an entry's compressed data begins.
    ///
    /// The Local File Header's name and extra field lengths may differ
    /// from the central directory copy, so they are read from the LFH.
    pub async fn get_data_offset(&self, entry: &ArchiveEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader
            .read_at(entry.lfh_offset, &mut lfh_buf)
            .await
            .context("Local File Header out of bounds")?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            bail!("Invalid Local File Header");
        }

        let mut cursor = Cursor::new(&lfh_buf);
        cursor.set_position(26); // Offset to filename length field

        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;
    use std::io::Write;
    use zip::CompressionMethod as ZipMethod;
    use zip::write::SimpleFileOptions;

    fn build_zip(files: &[(&str, &str)], comment: Option<&str>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(ZipMethod::Stored);
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        if let Some(comment) = comment {
            writer.set_comment(comment);
        }
        writer.finish().unwrap().into_inner()
    }

    /// A single stored entry where every size and offset lives in ZIP64 records.
    fn build_zip64(name: &str, data: &[u8]) -> Vec<u8> {
        use byteorder::WriteBytesExt;

        let mut crc = flate2::Crc::new();
        crc.update(data);
        let size = data.len() as u64;
        let mut out: Vec<u8> = Vec::new();

        out.extend_from_slice(LFH_SIGNATURE);
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap(); // stored
        out.write_u32::<LittleEndian>(0).unwrap(); // time and date
        out.write_u32::<LittleEndian>(crc.sum()).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(20).unwrap();
        out.extend_from_slice(name.as_bytes());
        out.write_u16::<LittleEndian>(0x0001).unwrap();
        out.write_u16::<LittleEndian>(16).unwrap();
        out.write_u64::<LittleEndian>(size).unwrap();
        out.write_u64::<LittleEndian>(size).unwrap();
        out.extend_from_slice(data);

        let cd_offset = out.len() as u64;
        out.extend_from_slice(CDFH_SIGNATURE);
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap(); // stored
        out.write_u32::<LittleEndian>(0).unwrap(); // time and date
        out.write_u32::<LittleEndian>(crc.sum()).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(28).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap(); // comment
        out.write_u16::<LittleEndian>(0).unwrap(); // disk
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.extend_from_slice(name.as_bytes());
        out.write_u16::<LittleEndian>(0x0001).unwrap();
        out.write_u16::<LittleEndian>(24).unwrap();
        out.write_u64::<LittleEndian>(size).unwrap();
        out.write_u64::<LittleEndian>(size).unwrap();
        out.write_u64::<LittleEndian>(0).unwrap();
        let cd_size = out.len() as u64 - cd_offset;

        let eocd64_offset = out.len() as u64;
        out.extend_from_slice(Zip64EOCD::SIGNATURE);
        out.write_u64::<LittleEndian>(44).unwrap();
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u64::<LittleEndian>(1).unwrap();
        out.write_u64::<LittleEndian>(1).unwrap();
        out.write_u64::<LittleEndian>(cd_size).unwrap();
        out.write_u64::<LittleEndian>(cd_offset).unwrap();

        out.extend_from_slice(Zip64EOCDLocator::SIGNATURE);
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
        out.write_u32::<LittleEndian>(1).unwrap();

        out.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        out.write_u32::<LittleEndian>(0).unwrap(); // disk numbers
        out.write_u16::<LittleEndian>(0xFFFF).unwrap();
        out.write_u16::<LittleEndian>(0xFFFF).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out
    }

    fn parser(bytes: Vec<u8>) -> ZipParser<MemoryReader> {
        ZipParser::new(Arc::new(MemoryReader::new(bytes)))
    }

    #[tokio::test]
    async fn lists_entries_in_directory_order() {
        let bytes = build_zip(&[("b.json", "[]"), ("a.json", "[1]")], None);
        let entries = parser(bytes).list_files().await.unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.json", "a.json"]);
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].uncompressed_size, 3);
        assert_eq!(entries[0].compression_method, CompressionMethod::Stored);
    }

    #[tokio::test]
    async fn finds_eocd_behind_a_comment() {
        let bytes = build_zip(&[("one.json", "[]")], Some("exported by payroll"));
        let entries = parser(bytes).list_files().await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn empty_input_is_not_a_zip() {
        let err = parser(Vec::new()).list_files().await.unwrap_err();
        assert!(format!("{:#}", err).contains("not a valid zip file"));
    }

    #[tokio::test]
    async fn random_bytes_are_not_a_zip() {
        let err = parser(b"this is certainly not an archive".to_vec())
            .list_files()
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not a valid zip file"));
    }

    #[tokio::test]
    async fn truncated_central_directory_is_rejected() {
        let mut bytes = build_zip(&[("one.json", "[]")], None);
        // Point the central directory far past the end of the archive
        let len = bytes.len();
        bytes[len - 6..len - 2].copy_from_slice(&u32::MAX.wrapping_sub(1).to_le_bytes());
        let err = parser(bytes).list_files().await.unwrap_err();
        assert!(format!("{:#}", err).contains("not a valid zip file"));
    }

    #[tokio::test]
    async fn data_offset_skips_local_header() {
        let bytes = build_zip(&[("x.json", "[]")], None);
        let parser = parser(bytes);
        let entries = parser.list_files().await.unwrap();
        let offset = parser.get_data_offset(&entries[0]).await.unwrap();
        // 30 byte header plus the 6 byte name, no extra field for stored entries
        assert!(offset >= (LFH_SIZE + "x.json".len()) as u64);

        let mut data = vec![0u8; 2];
        parser.reader().read_at(offset, &mut data).await.unwrap();
        assert_eq!(data, b"[]");
    }

    #[tokio::test]
    async fn zip64_records_supply_sizes_and_offsets() {
        let payload = br#"[{"username":"z64"}]"#;
        let bytes = build_zip64("big.json", payload);
        let parser = parser(bytes);

        let (eocd, eocd_offset) = parser.find_eocd().await.unwrap();
        assert!(eocd.is_zip64());
        let eocd64 = parser.read_zip64_eocd(eocd_offset).await.unwrap();
        assert_eq!(eocd64.total_entries, 1);

        let entries = parser.list_files().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "big.json");
        assert_eq!(entries[0].lfh_offset, 0);
        assert_eq!(entries[0].compressed_size, payload.len() as u64);
        assert_eq!(entries[0].uncompressed_size, payload.len() as u64);

        let offset = parser.get_data_offset(&entries[0]).await.unwrap();
        let mut data = vec![0u8; payload.len()];
        parser.reader().read_at(offset, &mut data).await.unwrap();
        assert_eq!(data, payload);
    }

    #[tokio::test]
    async fn zip64_locator_must_fit_before_the_eocd() {
        let parser = parser(build_zip(&[("a.json", "[]")], None));
        assert!(parser.read_zip64_eocd(4).await.is_err());
    }
}
