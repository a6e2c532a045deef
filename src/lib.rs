pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use config::{JobConfig, StoreConfig};
pub use error::StoreError;
pub use models::{FileMetadata, MemberSession, StagedFile, UploadSession};
pub use services::remote_store::{OpenHumansClient, RemoteFileStore};
pub use services::replace::replace;
pub use services::staging::stage;
pub use services::sync_job::{
    DataSource, JobOutcome, JobScheduler, SessionProvider, SyncJob,
};
