use bytes::Bytes;
use serde::{Deserialize, Serialize};

use reels_core::models::{ContentItem, NewContent, ProcessingJob};

/// One complete file plus its catalog metadata, ready for validation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub metadata: NewContent,
    pub data: Bytes,
    /// Client-reported duration, if known before processing.
    pub duration_seconds: Option<f64>,
}

/// Progress snapshot emitted after each committed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
    /// Whole percent, floored. Reaches 100 only when every byte is committed.
    pub percent: u8,
}

impl UploadProgress {
    pub fn new(uploaded_bytes: u64, total_bytes: u64) -> Self {
        let percent = if total_bytes == 0 {
            100
        } else {
            ((uploaded_bytes * 100) / total_bytes) as u8
        };
        Self {
            uploaded_bytes,
            total_bytes,
            percent,
        }
    }
}

/// Result of a completed upload: the finalized content record and the
/// post-processing jobs enqueued for it.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub content: ContentItem,
    pub jobs: Vec<ProcessingJob>,
    pub chunks_uploaded: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_is_floored() {
        let p = UploadProgress::new(5 * 1024 * 1024, 12 * 1024 * 1024);
        assert_eq!(p.percent, 41);
    }

    #[test]
    fn test_progress_full() {
        let p = UploadProgress::new(12, 12);
        assert_eq!(p.percent, 100);
    }

    #[test]
    fn test_progress_never_reaches_100_early() {
        let p = UploadProgress::new(99, 100);
        assert_eq!(p.percent, 99);
    }
}
