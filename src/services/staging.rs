use crate::models::{FileMetadata, StagedFile};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Write the user data payload to `workdir/basename` and hand back the
/// staged file description.
///
/// The basename comes from job configuration and must stay stable across
/// runs for the same logical file, so a later run replaces the previous
/// upload instead of accumulating next to it. The caller owns `workdir`
/// (creation and cleanup); staging only ever creates the one data file
/// inside it and performs no network calls.
pub fn stage(
    workdir: &Path,
    basename: &str,
    user_data: &serde_json::Value,
    metadata: FileMetadata,
) -> Result<StagedFile> {
    let path = workdir.join(basename);
    let body = serde_json::to_vec(user_data).context("serializing user data")?;
    let size = body.len();
    fs::write(&path, body).with_context(|| format!("writing staged file {}", path.display()))?;

    tracing::debug!("Staged {} bytes at {}", size, path.display());

    Ok(StagedFile {
        path,
        basename: basename.to_string(),
        metadata,
    })
}
