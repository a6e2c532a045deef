use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.openhumans.org";

/// Remote store configuration, passed into the client constructor instead of
/// being read from process-global settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the Open Humans API host
    pub base_url: Url,

    /// Per-request timeout in seconds (default: 120)
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: env::var("OH_BASE_URL")
                .ok()
                .and_then(|v| Url::parse(&v).ok())
                .unwrap_or(default.base_url),

            request_timeout: env::var("OH_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.request_timeout),
        }
    }
}

/// Per-job settings for the sync worker.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Logical filename used for dedup matching on the remote store.
    /// Must stay stable across runs so later runs replace rather than
    /// accumulate (default: "user-data.json")
    pub file_basename: String,

    /// Description attached to the uploaded file's metadata
    pub metadata_description: String,

    /// Tags attached to the uploaded file's metadata
    pub metadata_tags: Vec<String>,

    /// Delay before a rate-limited job is re-enqueued (default: 61 s)
    pub reschedule_delay: Duration,

    /// Parent directory for the scoped staging directory; system temp
    /// directory when unset
    pub staging_root: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            file_basename: "user-data.json".to_string(),
            metadata_description: "Synced data file.".to_string(),
            metadata_tags: vec!["sync".to_string()],
            reschedule_delay: Duration::from_secs(61),
            staging_root: None,
        }
    }
}

impl JobConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            file_basename: env::var("OH_FILE_BASENAME").unwrap_or(default.file_basename),

            metadata_description: env::var("OH_FILE_DESCRIPTION")
                .unwrap_or(default.metadata_description),

            metadata_tags: env::var("OH_FILE_TAGS")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or(default.metadata_tags),

            reschedule_delay: env::var("OH_RESCHEDULE_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.reschedule_delay),

            staging_root: env::var("OH_STAGING_ROOT").ok().map(PathBuf::from),
        }
    }
}
