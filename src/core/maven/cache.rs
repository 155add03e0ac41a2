use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::artifact::ArtifactCoordinate;
use crate::core::error::{ResolverError, ResolverResult};

/// On-disk mirror of the remote repository layout.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<group as dirs>/<artifactId>/<version>/<filename>`
    pub fn path_for(&self, artifact: &ArtifactCoordinate) -> PathBuf {
        self.root.join(artifact.local_path())
    }

    /// Cached path for the artifact, if a non-empty regular file is present.
    ///
    /// Never writes or creates anything.
    pub async fn find(&self, artifact: &ArtifactCoordinate) -> Option<PathBuf> {
        let path = self.path_for(artifact);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
            Ok(_) => {
                debug!("Ignoring empty or non-file cache entry {:?}", path);
                None
            }
            Err(_) => None,
        }
    }

    /// Write `bytes` as the cached copy of `artifact`.
    ///
    /// The content goes to a uniquely named sibling file which is then
    /// renamed into place, so readers never observe a partial artifact.
    pub async fn store(&self, artifact: &ArtifactCoordinate, bytes: &[u8]) -> ResolverResult<PathBuf> {
        let dest = self.path_for(artifact);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ResolverError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = dest.with_file_name(format!(
            ".{}.{}.part",
            artifact.filename(),
            uuid::Uuid::new_v4().simple()
        ));

        if let Err(e) = write_file(&temp_path, bytes).await {
            discard(&temp_path).await;
            return Err(e);
        }

        if let Err(source) = tokio::fs::rename(&temp_path, &dest).await {
            discard(&temp_path).await;
            return Err(ResolverError::Io { path: dest, source });
        }

        debug!("Cached {} -> {:?}", artifact, dest);
        Ok(dest)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> ResolverResult<()> {
    let io_err = |source: std::io::Error| ResolverError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Handle is dropped before the rename; Windows refuses to move open files.
    let mut file = tokio::fs::File::create(path).await.map_err(io_err)?;
    file.write_all(bytes).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    file.sync_all().await.map_err(io_err)?;
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove temp file {:?}: {}", path, e);
        }
    }
}
