mod artifact;
mod cache;
mod loader;
mod resolver;

pub use artifact::{ArtifactCoordinate, DEFAULT_EXTENSION};
pub use cache::LocalRepository;
pub use loader::{MavenResource, MavenResourceLoader, MAVEN_SCHEME};
pub use resolver::{ArtifactResolver, DEFAULT_CONCURRENCY};
