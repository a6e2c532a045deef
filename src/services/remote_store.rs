use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{FileMetadata, MemberSession, RemoteFileInfo, UploadSession};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

/// The remote file store contract: one explicit network call per operation,
/// no retries inside the client. What to do with each failure is the replace
/// protocol's decision, not this layer's.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Delete the member's remote file with the given basename.
    /// `StoreError::NotFound` when no such file exists.
    async fn delete(&self, session: &MemberSession, basename: &str) -> Result<(), StoreError>;

    /// Request an upload target for a new file.
    async fn begin_upload(
        &self,
        session: &MemberSession,
        basename: &str,
        metadata: &FileMetadata,
    ) -> Result<UploadSession, StoreError>;

    /// Transfer the file bytes to the upload target.
    async fn put(&self, upload: &UploadSession, data: Bytes) -> Result<(), StoreError>;

    /// Tell the remote the transfer finished; only after this call may the
    /// store report the file as present.
    async fn complete(
        &self,
        session: &MemberSession,
        upload: &UploadSession,
    ) -> Result<(), StoreError>;
}

/// Failure modes shared by every authenticated call.
fn classify_common(status: StatusCode) -> Option<StoreError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Some(StoreError::Auth(format!("remote returned {status}")))
        }
        StatusCode::TOO_MANY_REQUESTS => Some(StoreError::RateLimited),
        _ => None,
    }
}

#[derive(Deserialize)]
struct ExchangeMemberResponse {
    data: Vec<RemoteFileInfo>,
}

/// Client for the Open Humans direct-sharing API.
pub struct OpenHumansClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenHumansClient {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/direct-sharing/project/{}", self.base_url, path)
    }

    /// List the member's current remote files with their metadata and
    /// download URLs.
    pub async fn member_files(
        &self,
        session: &MemberSession,
    ) -> Result<Vec<RemoteFileInfo>, StoreError> {
        let resp = self
            .http
            .get(self.endpoint("exchange-member/"))
            .query(&[("access_token", session.access_token.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            if let Some(err) = classify_common(status) {
                return Err(err);
            }
            return Err(StoreError::Transfer(format!(
                "exchange-member returned {status}"
            )));
        }

        let member: ExchangeMemberResponse = resp.json().await?;
        Ok(member.data)
    }

    /// Fetch one remote file body from its download URL.
    pub async fn download(&self, url: &str) -> Result<Bytes, StoreError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Transfer(format!("download returned {status}")));
        }
        Ok(resp.bytes().await?)
    }
}

#[async_trait]
impl RemoteFileStore for OpenHumansClient {
    async fn delete(&self, session: &MemberSession, basename: &str) -> Result<(), StoreError> {
        let resp = self
            .http
            .post(self.endpoint("files/delete/"))
            .query(&[("access_token", session.access_token.as_str())])
            .json(&json!({
                "project_member_id": session.member_id,
                "file_basename": basename,
            }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!("Deleted remote file {} for {}", basename, session.member_id);
            return Ok(());
        }
        if let Some(err) = classify_common(status) {
            return Err(err);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        Err(StoreError::Transfer(format!("delete returned {status}")))
    }

    async fn begin_upload(
        &self,
        session: &MemberSession,
        basename: &str,
        metadata: &FileMetadata,
    ) -> Result<UploadSession, StoreError> {
        // The API expects the metadata mapping as a JSON string field.
        let metadata_json = serde_json::to_string(metadata)
            .map_err(|e| StoreError::Transfer(format!("encoding metadata: {e}")))?;

        let resp = self
            .http
            .post(self.endpoint("files/upload/direct/"))
            .query(&[("access_token", session.access_token.as_str())])
            .json(&json!({
                "project_member_id": session.member_id,
                "filename": basename,
                "metadata": metadata_json,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            if let Some(err) = classify_common(status) {
                return Err(err);
            }
            return Err(StoreError::Transfer(format!(
                "begin upload returned {status}"
            )));
        }

        let upload: UploadSession = resp.json().await?;
        tracing::debug!(
            "Upload target issued for {} (file id {})",
            basename,
            upload.remote_file_id
        );
        Ok(upload)
    }

    async fn put(&self, upload: &UploadSession, data: Bytes) -> Result<(), StoreError> {
        // Target URL is pre-signed; no access token here.
        let resp = self.http.put(&upload.target_url).body(data).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Transfer(format!("put returned {status}")));
        }
        Ok(())
    }

    async fn complete(
        &self,
        session: &MemberSession,
        upload: &UploadSession,
    ) -> Result<(), StoreError> {
        let resp = self
            .http
            .post(self.endpoint("files/upload/complete/"))
            .query(&[("access_token", session.access_token.as_str())])
            .json(&json!({
                "project_member_id": session.member_id,
                "file_id": upload.remote_file_id,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            if let Some(err) = classify_common(status) {
                return Err(err);
            }
            return Err(StoreError::Confirm(format!("complete returned {status}")));
        }
        Ok(())
    }
}
