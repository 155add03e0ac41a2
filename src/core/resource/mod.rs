mod file;
mod router;

use std::path::PathBuf;

pub use file::{FileResource, FileSystemResourceLoader, FILE_SCHEME};
pub use router::{split_scheme, DelegatingResourceLoader, SchemeSplit};

use crate::core::error::ResolverResult;
use crate::core::maven::MavenResource;

/// Produces a [`Resource`] for a location string.
pub trait ResourceLoader: Send + Sync {
    fn get_resource(&self, location: &str) -> ResolverResult<Resource>;
}

/// A handle returned by a [`ResourceLoader`].
#[derive(Debug, Clone)]
pub enum Resource {
    File(FileResource),
    Maven(MavenResource),
}

impl Resource {
    pub fn filename(&self) -> Option<String> {
        match self {
            Resource::File(f) => f.filename(),
            Resource::Maven(m) => Some(m.filename()),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Resource::File(f) => f.description(),
            Resource::Maven(m) => m.description(),
        }
    }

    pub async fn exists(&self) -> bool {
        match self {
            Resource::File(f) => f.exists().await,
            Resource::Maven(m) => m.exists().await,
        }
    }

    /// Local path to the resource content.
    pub async fn file(&self) -> ResolverResult<PathBuf> {
        match self {
            Resource::File(f) => f.file().await,
            Resource::Maven(m) => m.file().await,
        }
    }
}
