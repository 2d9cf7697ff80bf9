use anyhow::Result;
use async_trait::async_trait;

use super::{ReadAt, check_bounds};

/// Random access over an archive that has been fully downloaded.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        check_bounds(offset, buf.len(), self.size())?;

        let start = offset as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_inside_bounds() {
        let reader = MemoryReader::new(b"hello world".to_vec());
        let mut buf = [0u8; 5];
        let n = reader.read_at(6, &mut buf).await.unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"world");
        assert_eq!(reader.size(), 11);
    }

    #[tokio::test]
    async fn rejects_reads_past_the_end() {
        let reader = MemoryReader::new(b"short".to_vec());
        let mut buf = [0u8; 4];
        assert!(reader.read_at(3, &mut buf).await.is_err());
        assert!(reader.read_at(u64::MAX, &mut buf).await.is_err());
    }

    #[tokio::test]
    async fn empty_read_is_always_fine() {
        let reader = MemoryReader::new(Vec::new());
        let mut buf = [0u8; 0];
        assert_eq!(reader.read_at(0, &mut buf).await.unwrap(), 0);
    }
}
