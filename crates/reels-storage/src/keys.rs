//! Shared key generation for storage backends.
//!
//! Chunk objects are intermediate artifacts under `uploads/{video_id}/`;
//! finalized videos live under `reels/`. All backends must use this layout.

use uuid::Uuid;

/// Key for one intermediate chunk object of an in-flight upload.
pub fn chunk_key(video_id: Uuid, index: usize) -> String {
    format!("uploads/{}/chunk_{:05}", video_id, index)
}

/// Key for the finalized video object.
pub fn final_key(video_id: Uuid, extension: &str) -> String {
    format!("reels/{}.{}", video_id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_is_zero_padded() {
        let id = Uuid::nil();
        assert_eq!(
            chunk_key(id, 7),
            "uploads/00000000-0000-0000-0000-000000000000/chunk_00007"
        );
    }

    #[test]
    fn test_chunk_keys_sort_in_upload_order() {
        let id = Uuid::new_v4();
        let mut keys: Vec<String> = (0..12).map(|i| chunk_key(id, i)).collect();
        let ordered = keys.clone();
        keys.sort();
        assert_eq!(keys, ordered);
    }

    #[test]
    fn test_final_key_uses_extension() {
        let id = Uuid::nil();
        assert_eq!(
            final_key(id, "mp4"),
            "reels/00000000-0000-0000-0000-000000000000.mp4"
        );
    }
}
