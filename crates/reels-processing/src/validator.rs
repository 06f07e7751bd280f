//! Pre-upload validation
//!
//! Everything here runs before any byte reaches storage, so a rejected upload
//! leaves no draft record and no orphaned chunks.

use reels_core::{AppError, ReelsConfig};
use validator::Validate;

use crate::upload::UploadRequest;

/// Validates upload requests against the configured limits.
#[derive(Clone)]
pub struct UploadValidator {
    max_file_size_bytes: usize,
    max_duration_seconds: u32,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(config: &ReelsConfig) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            max_duration_seconds: config.max_duration_seconds,
            allowed_extensions: config.allowed_extensions.clone(),
            allowed_content_types: config.allowed_content_types.clone(),
        }
    }

    pub fn validate(&self, request: &UploadRequest) -> Result<(), AppError> {
        request.metadata.validate()?;
        if request.metadata.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title must not be empty".to_string()));
        }
        if request.data.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }
        if request.data.len() > self.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File size {} exceeds maximum of {} bytes",
                request.data.len(),
                self.max_file_size_bytes
            )));
        }

        let extension = extract_extension(&request.filename).ok_or_else(|| {
            AppError::InvalidInput(format!("Filename '{}' has no extension", request.filename))
        })?;
        if !self
            .allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension))
        {
            return Err(AppError::InvalidInput(format!(
                "File extension '{}' is not allowed",
                extension
            )));
        }

        if !self
            .allowed_content_types
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&request.metadata.content_type))
        {
            return Err(AppError::InvalidInput(format!(
                "Content type '{}' is not allowed",
                request.metadata.content_type
            )));
        }

        if let Some(duration) = request.duration_seconds {
            if duration > self.max_duration_seconds as f64 {
                return Err(AppError::InvalidInput(format!(
                    "Duration {}s exceeds maximum of {}s",
                    duration, self.max_duration_seconds
                )));
            }
        }

        Ok(())
    }
}

/// Lowercased extension without the dot, `None` when the filename has none.
pub fn extract_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reels_core::models::NewContent;

    fn request(filename: &str, content_type: &str, size: usize) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            metadata: NewContent {
                title: "Wire EDM setup".to_string(),
                description: None,
                machine_models: vec![],
                process_type: None,
                tooling: vec![],
                skill_level: None,
                tags: vec![],
                content_type: content_type.to_string(),
                file_size: size as i64,
            },
            data: Bytes::from(vec![0u8; size]),
            duration_seconds: None,
        }
    }

    fn validator() -> UploadValidator {
        UploadValidator::new(&ReelsConfig::default())
    }

    #[test]
    fn test_valid_mp4_passes() {
        assert!(validator()
            .validate(&request("intro.mp4", "video/mp4", 1024))
            .is_ok());
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(validator()
            .validate(&request("intro.MP4", "video/mp4", 1024))
            .is_ok());
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        let err = validator()
            .validate(&request("intro.exe", "video/mp4", 1024))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validator()
            .validate(&request("intro", "video/mp4", 1024))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_disallowed_content_type() {
        let err = validator()
            .validate(&request("intro.mp4", "application/pdf", 1024))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validator()
            .validate(&request("intro.mp4", "video/mp4", 0))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let mut config = ReelsConfig::default();
        config.max_file_size_bytes = 100;
        let validator = UploadValidator::new(&config);
        let err = validator
            .validate(&request("intro.mp4", "video/mp4", 101))
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_rejects_empty_title() {
        let mut req = request("intro.mp4", "video/mp4", 1024);
        req.metadata.title = "   ".to_string();
        let err = validator().validate(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_blank_content_type() {
        let mut req = request("intro.mp4", "video/mp4", 1024);
        req.metadata.content_type = String::new();
        let err = validator().validate(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_overlong_title() {
        let mut req = request("intro.mp4", "video/mp4", 1024);
        req.metadata.title = "x".repeat(256);
        let err = validator().validate(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_excessive_duration() {
        let mut req = request("intro.mp4", "video/mp4", 1024);
        req.duration_seconds = Some(3.0 * 60.0 * 60.0);
        let err = validator().validate(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(extract_extension("a.mp4"), Some("mp4".to_string()));
        assert_eq!(extract_extension("dir/a.b.MKV"), Some("mkv".to_string()));
        assert_eq!(extract_extension("noext"), None);
        assert_eq!(extract_extension(".hidden"), None);
        assert_eq!(extract_extension("trailing."), None);
    }
}
