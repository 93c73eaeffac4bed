//! Staging directory for downloaded attachments.
//!
//! Files are keyed by attachment name; a later file with the same name
//! replaces the earlier one. Writes go to a temporary sibling first and are
//! renamed into place, so readers never observe a partial file.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::RetrievalError;

/// A directory attachments are written into.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create the staging directory (and parents) if missing. Idempotent.
    pub async fn prepare(root: impl Into<PathBuf>) -> Result<Self, RetrievalError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!(dir = %root.display(), "Staging directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a file named `name` is staged at.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, RetrievalError> {
        Ok(self.root.join(file_name(name)?))
    }

    /// Write `bytes` under `name`, replacing any existing file of that name.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, RetrievalError> {
        let target = self.path_for(name)?;
        let tmp = self.root.join(format!(".{}.{}.part", file_name(name)?, Uuid::new_v4()));

        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(target)
    }
}

/// Reduce an attachment name to a bare file name.
///
/// Directory components (either separator) are stripped; names that are
/// empty or only dots afterwards are rejected.
pub fn file_name(name: &str) -> Result<&str, RetrievalError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base.chars().all(|c| c == '.') {
        return Err(RetrievalError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(base)
}
