//! Chunk arithmetic for a single upload
//!
//! A session slices the file into fixed-size chunks (the last one may be
//! short) and tracks committed bytes. Slicing `Bytes` is zero-copy.

use bytes::Bytes;

use crate::upload::UploadProgress;

pub struct UploadSession {
    data: Bytes,
    chunk_size: usize,
    committed_chunks: u32,
}

impl UploadSession {
    /// `chunk_size` of zero falls back to a single chunk.
    pub fn new(data: Bytes, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            data.len().max(1)
        } else {
            chunk_size
        };
        Self {
            data,
            chunk_size,
            committed_chunks: 0,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn total_chunks(&self) -> u32 {
        self.data.len().div_ceil(self.chunk_size) as u32
    }

    /// The byte slice for chunk `index`, or `None` past the end.
    pub fn chunk(&self, index: u32) -> Option<Bytes> {
        let start = index as usize * self.chunk_size;
        if start >= self.data.len() {
            return None;
        }
        let end = (start + self.chunk_size).min(self.data.len());
        Some(self.data.slice(start..end))
    }

    /// Mark the next chunk committed and return the progress snapshot.
    pub fn commit_chunk(&mut self) -> UploadProgress {
        self.committed_chunks += 1;
        UploadProgress::new(self.committed_bytes(), self.total_bytes())
    }

    pub fn committed_bytes(&self) -> u64 {
        let full = self.committed_chunks as u64 * self.chunk_size as u64;
        full.min(self.total_bytes())
    }

    pub fn is_complete(&self) -> bool {
        self.committed_chunks >= self.total_chunks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn test_chunk_count_with_short_tail() {
        let session = UploadSession::new(Bytes::from(vec![0u8; 12 * MIB]), 5 * MIB);
        assert_eq!(session.total_chunks(), 3);
        assert_eq!(session.chunk(0).unwrap().len(), 5 * MIB);
        assert_eq!(session.chunk(1).unwrap().len(), 5 * MIB);
        assert_eq!(session.chunk(2).unwrap().len(), 2 * MIB);
        assert!(session.chunk(3).is_none());
    }

    #[test]
    fn test_exact_multiple_has_no_tail() {
        let session = UploadSession::new(Bytes::from(vec![0u8; 10 * MIB]), 5 * MIB);
        assert_eq!(session.total_chunks(), 2);
        assert_eq!(session.chunk(1).unwrap().len(), 5 * MIB);
    }

    #[test]
    fn test_file_smaller_than_chunk_is_one_chunk() {
        let session = UploadSession::new(Bytes::from(vec![0u8; 100]), 5 * MIB);
        assert_eq!(session.total_chunks(), 1);
        assert_eq!(session.chunk(0).unwrap().len(), 100);
    }

    #[test]
    fn test_progress_is_monotone_and_ends_at_100() {
        let mut session = UploadSession::new(Bytes::from(vec![0u8; 12 * MIB]), 5 * MIB);
        let mut last_percent = 0;
        let mut snapshots = Vec::new();
        while !session.is_complete() {
            let progress = session.commit_chunk();
            assert!(progress.percent >= last_percent);
            last_percent = progress.percent;
            snapshots.push(progress.uploaded_bytes);
        }
        assert_eq!(
            snapshots,
            vec![5 * MIB as u64, 10 * MIB as u64, 12 * MIB as u64]
        );
        assert_eq!(last_percent, 100);
    }

    #[test]
    fn test_zero_chunk_size_falls_back_to_single_chunk() {
        let session = UploadSession::new(Bytes::from(vec![0u8; 10]), 0);
        assert_eq!(session.total_chunks(), 1);
    }
}
