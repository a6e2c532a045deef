use thiserror::Error;

/// Errors surfaced by the remote file store.
///
/// Only two variants are ever resolved inside this crate: `NotFound` is
/// swallowed at the delete step of the replace protocol, and `RateLimited`
/// turns into a reschedule at the job wrapper. Everything else propagates
/// to the task framework untouched.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("remote file not found")]
    NotFound,

    #[error("authorization rejected: {0}")]
    Auth(String),

    #[error("rate limited by the remote store")]
    RateLimited,

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("upload confirmation failed: {0}")]
    Confirm(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}
