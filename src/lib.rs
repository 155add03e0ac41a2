mod core;

use std::collections::HashMap;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::{
    default_local_repository, Credentials, RemoteRepository, ResolutionConfig,
};
pub use crate::core::downloader::{HttpTransport, Transport};
pub use crate::core::error::{ResolverError, ResolverResult, UnresolvableReason};
pub use crate::core::maven::{
    ArtifactCoordinate, ArtifactResolver, LocalRepository, MavenResource, MavenResourceLoader,
    DEFAULT_CONCURRENCY, DEFAULT_EXTENSION, MAVEN_SCHEME,
};
pub use crate::core::resource::{
    split_scheme, DelegatingResourceLoader, FileResource, FileSystemResourceLoader, Resource,
    ResourceLoader, SchemeSplit, FILE_SCHEME,
};

/// Install a `tracing` fmt subscriber. `RUST_LOG` overrides the default
/// filter. Calling it again is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,maven_resource=debug")),
        )
        .try_init();
}

/// Router with the standard `maven` and `file` handlers.
pub fn default_resource_loader(
    config: ResolutionConfig,
) -> ResolverResult<DelegatingResourceLoader> {
    let resolver = Arc::new(ArtifactResolver::new(config)?);
    tracing::info!(
        "Maven resources resolve into {:?}",
        resolver.config().local_repository()
    );

    let mut loaders: HashMap<&str, Arc<dyn ResourceLoader>> = HashMap::new();
    loaders.insert(MAVEN_SCHEME, Arc::new(MavenResourceLoader::new(resolver)));
    loaders.insert(FILE_SCHEME, Arc::new(FileSystemResourceLoader));
    DelegatingResourceLoader::new(loaders)
}
