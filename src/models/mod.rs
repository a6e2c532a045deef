use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A member's credentials for one job run. Owned by the external auth
/// layer; this crate reads it per invocation and never persists it.
#[derive(Debug, Clone)]
pub struct MemberSession {
    pub member_id: String,
    pub access_token: String,
}

/// Descriptive metadata attached to an uploaded file, sent verbatim to the
/// remote store on begin_upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileMetadata {
    pub fn new(description: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            description: description.into(),
            tags,
            updated_at: Some(Utc::now()),
        }
    }
}

/// A payload written out for upload. Lives inside the job's scoped staging
/// directory and disappears with it.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub basename: String,
    pub metadata: FileMetadata,
}

/// Handle returned by begin_upload: where to put the bytes and which id to
/// confirm. Lifetime is one upload attempt, never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSession {
    #[serde(rename = "url")]
    pub target_url: String,
    #[serde(rename = "id")]
    pub remote_file_id: String,
}

/// One entry of a member's current remote file set, as reported by the
/// exchange-member endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFileInfo {
    pub basename: String,
    pub download_url: String,
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
}
