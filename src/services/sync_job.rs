use crate::config::JobConfig;
use crate::error::StoreError;
use crate::models::{FileMetadata, MemberSession};
use crate::services::remote_store::{OpenHumansClient, RemoteFileStore};
use crate::services::{replace, staging};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Resolves a member's session from an opaque member id. Owned by the
/// surrounding web application's auth layer; token refresh happens behind
/// this seam.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn member_session(&self, member_id: &str) -> Result<MemberSession>;
}

/// Produces the payload to upload for a member.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, session: &MemberSession) -> Result<serde_json::Value>;
}

/// Re-enqueues a job for later execution. Real queueing (and the
/// one-in-flight-job-per-member guarantee) belongs to the external task
/// framework behind this seam.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn schedule(&self, member_id: &str, delay: Duration) -> Result<()>;
}

/// How one job instance ended. A reschedule is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Done,
    Rescheduled,
}

/// One data-refresh job per invocation: resolve the member session, stage
/// the payload into a scoped temporary directory, replace the remote file,
/// and decide whether to reschedule.
pub struct SyncJob {
    auth: Arc<dyn SessionProvider>,
    source: Arc<dyn DataSource>,
    store: Arc<dyn RemoteFileStore>,
    scheduler: Arc<dyn JobScheduler>,
    config: JobConfig,
}

impl SyncJob {
    pub fn new(
        auth: Arc<dyn SessionProvider>,
        source: Arc<dyn DataSource>,
        store: Arc<dyn RemoteFileStore>,
        scheduler: Arc<dyn JobScheduler>,
        config: JobConfig,
    ) -> Self {
        Self {
            auth,
            source,
            store,
            scheduler,
            config,
        }
    }

    /// Run one job instance for the given member.
    ///
    /// The staging directory is a `TempDir`, so it is removed on every exit
    /// path: success, reschedule, and error alike. On `RateLimited` a single
    /// follow-up job is scheduled and the instance exits cleanly; any other
    /// error propagates for the task framework's own retry policy.
    pub async fn process(&self, member_id: &str) -> Result<JobOutcome> {
        tracing::debug!("Started data sync for {}", member_id);
        let session = self.auth.member_session(member_id).await?;

        let workdir = match &self.config.staging_root {
            Some(root) => tempfile::tempdir_in(root),
            None => tempfile::tempdir(),
        }
        .context("creating staging directory")?;

        tracing::debug!("Staging payload for {}", member_id);
        let user_data = self.source.fetch(&session).await?;
        let metadata = FileMetadata::new(
            self.config.metadata_description.clone(),
            self.config.metadata_tags.clone(),
        );
        let staged = staging::stage(
            workdir.path(),
            &self.config.file_basename,
            &user_data,
            metadata,
        )?;

        tracing::debug!("Replacing remote file for {}", member_id);
        match replace::replace(self.store.as_ref(), &session, &staged).await {
            Ok(()) => {
                tracing::info!("Finished data sync for {}", member_id);
                Ok(JobOutcome::Done)
            }
            Err(StoreError::RateLimited) => {
                let delay = self.config.reschedule_delay;
                tracing::debug!(
                    "Requeued processing for {} with {} secs delay",
                    member_id,
                    delay.as_secs()
                );
                self.scheduler.schedule(member_id, delay).await?;
                Ok(JobOutcome::Rescheduled)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Session provider for one-shot runs: token from the `OH_ACCESS_TOKEN`
/// environment variable, member id passed through.
pub struct EnvSessionProvider;

#[async_trait]
impl SessionProvider for EnvSessionProvider {
    async fn member_session(&self, member_id: &str) -> Result<MemberSession> {
        let access_token =
            env::var("OH_ACCESS_TOKEN").context("OH_ACCESS_TOKEN must be set")?;
        Ok(MemberSession {
            member_id: member_id.to_string(),
            access_token,
        })
    }
}

/// Scheduler for one-shot runs: records the reschedule request in the log
/// and leaves the actual re-enqueue to the operator or queue.
pub struct LoggingScheduler;

#[async_trait]
impl JobScheduler for LoggingScheduler {
    async fn schedule(&self, member_id: &str, delay: Duration) -> Result<()> {
        tracing::warn!(
            "Rate limited; re-run member {} after {} secs",
            member_id,
            delay.as_secs()
        );
        Ok(())
    }
}

/// Generates the demo payload uploaded by the template out of the box.
pub struct DemoDataSource;

#[async_trait]
impl DataSource for DemoDataSource {
    async fn fetch(&self, session: &MemberSession) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "member": session.member_id,
            "generated_at": Utc::now().to_rfc3339(),
            "entries": [
                "Dummy data for demo.",
                "Replace this source with a real data integration.",
            ],
        }))
    }
}

/// Seeds the payload from the member's current remote file carrying the
/// given tag, so a refresh extends the existing data instead of starting
/// over. Falls back to an empty list when no tagged file exists yet.
pub struct ExistingDataSource {
    client: Arc<OpenHumansClient>,
    tag: String,
}

impl ExistingDataSource {
    pub fn new(client: Arc<OpenHumansClient>, tag: impl Into<String>) -> Self {
        Self {
            client,
            tag: tag.into(),
        }
    }
}

#[async_trait]
impl DataSource for ExistingDataSource {
    async fn fetch(&self, session: &MemberSession) -> Result<serde_json::Value> {
        let files = self
            .client
            .member_files(session)
            .await
            .map_err(|e| anyhow!("listing member files: {e}"))?;

        for file in files {
            let tagged = file
                .metadata
                .as_ref()
                .is_some_and(|m| m.tags.iter().any(|t| t == &self.tag));
            if !tagged {
                continue;
            }

            tracing::debug!(
                "Seeding payload from existing file {} for {}",
                file.basename,
                session.member_id
            );
            let body = self
                .client
                .download(&file.download_url)
                .await
                .map_err(|e| anyhow!("downloading {}: {e}", file.basename))?;
            return serde_json::from_slice(&body)
                .with_context(|| format!("parsing existing file {}", file.basename));
        }

        Ok(serde_json::json!([]))
    }
}
