use crate::error::StoreError;
use crate::models::{MemberSession, StagedFile};
use crate::services::remote_store::RemoteFileStore;
use bytes::Bytes;

/// Replace the member's remote file with the staged one: delete any current
/// file under the same basename, then run the three-phase upload (begin,
/// put, complete).
///
/// At most one delete and one upload attempt per invocation, delete always
/// first. A missing remote file at the delete step is already the state we
/// want and is swallowed; every other error propagates typed so the job
/// wrapper can turn `RateLimited` into a reschedule. When put or complete
/// fails the remote is left with no file under the basename — the store
/// only reports a file as present once complete succeeds, so no partial
/// upload is ever visible.
pub async fn replace(
    store: &dyn RemoteFileStore,
    session: &MemberSession,
    staged: &StagedFile,
) -> Result<(), StoreError> {
    match store.delete(session, &staged.basename).await {
        Ok(()) => {
            tracing::debug!("Deleted old file for {}", session.member_id);
        }
        Err(StoreError::NotFound) => {
            tracing::debug!("No old file to delete for {}", session.member_id);
        }
        Err(e) => return Err(e),
    }

    let upload = store
        .begin_upload(session, &staged.basename, &staged.metadata)
        .await?;

    let data = tokio::fs::read(&staged.path)
        .await
        .map_err(|e| StoreError::Transfer(format!("reading staged file: {e}")))?;
    store.put(&upload, Bytes::from(data)).await?;

    store.complete(session, &upload).await?;

    tracing::debug!("Uploaded new file for {}", session.member_id);
    Ok(())
}
