//! Configuration module
//!
//! Environment-driven configuration for the Reels core: database, storage,
//! upload limits, chunking, and processing toggles.

use std::env;

// Defaults
const DEFAULT_CHUNK_SIZE_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 2 * 1024 * 1024 * 1024;
const DEFAULT_MAX_DURATION_SECONDS: u32 = 2 * 60 * 60;
const DEFAULT_MAX_CHUNK_RETRIES: u32 = 3;
const DEFAULT_PERMISSION_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 30;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

/// Application configuration for the Reels core services.
#[derive(Clone, Debug)]
pub struct ReelsConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    // Local storage configuration
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_duration_seconds: u32,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Chunked upload configuration
    pub chunk_size_bytes: usize,
    pub max_chunk_retries: u32,
    // Post-upload processing toggles
    pub generate_thumbnails: bool,
    pub auto_transcribe: bool,
    // Auto-assignment: when true, machine-model matching ignores case.
    // Default is exact case-sensitive equality.
    pub machine_match_case_insensitive: bool,
    // Access resolver permission cache TTL
    pub permission_cache_ttl_secs: u64,
}

impl ReelsConfig {
    /// Load configuration from the environment, reading `.env` when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECONDS),
            environment: env_string("ENVIRONMENT", "development"),
            local_storage_path: env_string("LOCAL_STORAGE_PATH", "/var/lib/reels/media"),
            local_storage_base_url: env_string(
                "LOCAL_STORAGE_BASE_URL",
                "http://localhost:3000/media",
            ),
            max_file_size_bytes: env_parse("MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE_BYTES),
            max_duration_seconds: env_parse("MAX_DURATION_SECONDS", DEFAULT_MAX_DURATION_SECONDS),
            allowed_extensions: env_list(
                "ALLOWED_EXTENSIONS",
                &["mp4", "webm", "mov", "avi", "mkv"],
            ),
            allowed_content_types: env_list(
                "ALLOWED_CONTENT_TYPES",
                &[
                    "video/mp4",
                    "video/webm",
                    "video/quicktime",
                    "video/x-msvideo",
                    "video/x-matroska",
                ],
            ),
            chunk_size_bytes: env_parse("CHUNK_SIZE_BYTES", DEFAULT_CHUNK_SIZE_BYTES),
            max_chunk_retries: env_parse("MAX_CHUNK_RETRIES", DEFAULT_MAX_CHUNK_RETRIES),
            generate_thumbnails: env_bool("GENERATE_THUMBNAILS", true),
            auto_transcribe: env_bool("AUTO_TRANSCRIBE", false),
            machine_match_case_insensitive: env_bool("MACHINE_MATCH_CASE_INSENSITIVE", false),
            permission_cache_ttl_secs: env_parse(
                "PERMISSION_CACHE_TTL_SECS",
                DEFAULT_PERMISSION_CACHE_TTL_SECS,
            ),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

impl Default for ReelsConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_timeout_seconds: DEFAULT_DB_TIMEOUT_SECONDS,
            environment: "development".to_string(),
            local_storage_path: "/var/lib/reels/media".to_string(),
            local_storage_base_url: "http://localhost:3000/media".to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_duration_seconds: DEFAULT_MAX_DURATION_SECONDS,
            allowed_extensions: ["mp4", "webm", "mov", "avi", "mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: [
                "video/mp4",
                "video/webm",
                "video/quicktime",
                "video/x-msvideo",
                "video/x-matroska",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            max_chunk_retries: DEFAULT_MAX_CHUNK_RETRIES,
            generate_thumbnails: true,
            auto_transcribe: false,
            machine_match_case_insensitive: false,
            permission_cache_ttl_secs: DEFAULT_PERMISSION_CACHE_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_size_is_5_mib() {
        let config = ReelsConfig::default();
        assert_eq!(config.chunk_size_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_default_machine_match_is_case_sensitive() {
        let config = ReelsConfig::default();
        assert!(!config.machine_match_case_insensitive);
    }

    #[test]
    fn test_is_production() {
        let mut config = ReelsConfig::default();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "prod".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_default_allowed_extensions_cover_common_video() {
        let config = ReelsConfig::default();
        assert!(config.allowed_extensions.contains(&"mp4".to_string()));
        assert!(config.allowed_extensions.contains(&"webm".to_string()));
    }
}
