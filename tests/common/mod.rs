#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use oh_datauploader::services::sync_job::{DataSource, JobScheduler, SessionProvider};
use oh_datauploader::{FileMetadata, MemberSession, RemoteFileStore, StoreError, UploadSession};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Delete(String),
    BeginUpload(String),
    Put(String),
    Complete(String),
}

#[derive(Default)]
struct FakeStoreState {
    calls: Vec<StoreCall>,
    /// Files the platform reports as present: (basename, bytes). A file
    /// only lands here when complete succeeds; duplicates are representable
    /// on purpose so the single-live-file property is actually checkable.
    visible: Vec<(String, Vec<u8>)>,
    /// Uploads begun but not yet completed: id -> (basename, bytes put so far)
    pending: HashMap<String, (String, Option<Vec<u8>>)>,
    next_id: u64,
    fail_put: bool,
    fail_complete: bool,
    rate_limit_begin: bool,
    reject_auth: bool,
}

/// In-memory stand-in for the remote store. Marks a file visible only after
/// a successful complete call, and records every call for order assertions.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeStoreState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(basename: &str) -> Self {
        let store = Self::new();
        store
            .state
            .lock()
            .unwrap()
            .visible
            .push((basename.to_string(), b"old contents".to_vec()));
        store
    }

    pub fn fail_put(self) -> Self {
        self.state.lock().unwrap().fail_put = true;
        self
    }

    pub fn fail_complete(self) -> Self {
        self.state.lock().unwrap().fail_complete = true;
        self
    }

    pub fn rate_limit_begin(self) -> Self {
        self.state.lock().unwrap().rate_limit_begin = true;
        self
    }

    pub fn reject_auth(self) -> Self {
        self.state.lock().unwrap().reject_auth = true;
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn visible_count(&self, basename: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .visible
            .iter()
            .filter(|(name, _)| name == basename)
            .count()
    }

    pub fn visible_bytes(&self, basename: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .visible
            .iter()
            .find(|(name, _)| name == basename)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl RemoteFileStore for FakeStore {
    async fn delete(&self, _session: &MemberSession, basename: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Delete(basename.to_string()));

        let before = state.visible.len();
        state.visible.retain(|(name, _)| name != basename);
        if state.visible.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn begin_upload(
        &self,
        _session: &MemberSession,
        basename: &str,
        _metadata: &FileMetadata,
    ) -> Result<UploadSession, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::BeginUpload(basename.to_string()));

        if state.reject_auth {
            return Err(StoreError::Auth("remote returned 401 Unauthorized".to_string()));
        }
        if state.rate_limit_begin {
            return Err(StoreError::RateLimited);
        }

        state.next_id += 1;
        let id = state.next_id.to_string();
        state
            .pending
            .insert(id.clone(), (basename.to_string(), None));
        Ok(UploadSession {
            target_url: format!("memory://upload/{id}"),
            remote_file_id: id,
        })
    }

    async fn put(&self, upload: &UploadSession, data: Bytes) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(StoreCall::Put(upload.remote_file_id.clone()));

        if state.fail_put {
            return Err(StoreError::Transfer("put returned 500".to_string()));
        }

        match state.pending.get_mut(&upload.remote_file_id) {
            Some((_, bytes)) => {
                *bytes = Some(data.to_vec());
                Ok(())
            }
            None => Err(StoreError::Transfer("unknown upload target".to_string())),
        }
    }

    async fn complete(
        &self,
        _session: &MemberSession,
        upload: &UploadSession,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(StoreCall::Complete(upload.remote_file_id.clone()));

        if state.fail_complete {
            return Err(StoreError::Confirm("upload not found".to_string()));
        }

        match state.pending.remove(&upload.remote_file_id) {
            Some((basename, Some(bytes))) => {
                state.visible.push((basename, bytes));
                Ok(())
            }
            _ => Err(StoreError::Confirm("no bytes transferred".to_string())),
        }
    }
}

pub struct FakeSessions;

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn member_session(&self, member_id: &str) -> anyhow::Result<MemberSession> {
        Ok(MemberSession {
            member_id: member_id.to_string(),
            access_token: "fake-token".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    pub scheduled: Mutex<Vec<(String, Duration)>>,
}

#[async_trait]
impl JobScheduler for RecordingScheduler {
    async fn schedule(&self, member_id: &str, delay: Duration) -> anyhow::Result<()> {
        self.scheduled
            .lock()
            .unwrap()
            .push((member_id.to_string(), delay));
        Ok(())
    }
}

pub struct StaticSource(pub serde_json::Value);

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self, _session: &MemberSession) -> anyhow::Result<serde_json::Value> {
        Ok(self.0.clone())
    }
}

pub fn session(member_id: &str) -> MemberSession {
    MemberSession {
        member_id: member_id.to_string(),
        access_token: "fake-token".to_string(),
    }
}
