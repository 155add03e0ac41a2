use std::path::{Path, PathBuf};

use super::{Resource, ResourceLoader};
use crate::core::error::{ResolverError, ResolverResult};

pub const FILE_SCHEME: &str = "file";

/// A plain filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn description(&self) -> String {
        format!("File resource [{}]", self.path.display())
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }

    pub async fn file(&self) -> ResolverResult<PathBuf> {
        if self.exists().await {
            Ok(self.path.clone())
        } else {
            Err(ResolverError::FileNotFound(self.path.clone()))
        }
    }
}

/// Handles `file://<path>` and `file:<path>`; anything without the prefix
/// is taken as a path.
#[derive(Debug, Default, Clone)]
pub struct FileSystemResourceLoader;

impl ResourceLoader for FileSystemResourceLoader {
    fn get_resource(&self, location: &str) -> ResolverResult<Resource> {
        Ok(Resource::File(FileResource::new(location_to_path(location))))
    }
}

fn location_to_path(location: &str) -> PathBuf {
    let prefix_len = FILE_SCHEME.len() + 1;
    let rest = match location.get(..prefix_len) {
        Some(prefix) if prefix.eq_ignore_ascii_case("file:") => &location[prefix_len..],
        _ => return PathBuf::from(location),
    };

    // file://host/path: only the local host is meaningful here.
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .strip_prefix("localhost")
            .unwrap_or(authority_and_path),
        None => rest,
    };
    PathBuf::from(path)
}
