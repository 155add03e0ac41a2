use std::path::PathBuf;
use std::sync::Arc;

use super::artifact::ArtifactCoordinate;
use super::resolver::ArtifactResolver;
use crate::core::error::ResolverResult;
use crate::core::resource::{Resource, ResourceLoader};

pub const MAVEN_SCHEME: &str = "maven";

/// An artifact handle whose file is only produced on demand.
#[derive(Clone)]
pub struct MavenResource {
    coordinate: ArtifactCoordinate,
    resolver: Arc<ArtifactResolver>,
}

impl MavenResource {
    pub fn new(coordinate: ArtifactCoordinate, resolver: Arc<ArtifactResolver>) -> Self {
        Self {
            coordinate,
            resolver,
        }
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    pub fn filename(&self) -> String {
        self.coordinate.filename()
    }

    pub fn description(&self) -> String {
        format!("Maven resource [{}]", self.coordinate)
    }

    /// Local cache presence only.
    pub async fn exists(&self) -> bool {
        self.resolver.exists(&self.coordinate).await
    }

    /// Resolve the artifact, downloading it if needed.
    pub async fn file(&self) -> ResolverResult<PathBuf> {
        self.resolver.resolve(&self.coordinate).await
    }
}

impl std::fmt::Debug for MavenResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MavenResource")
            .field("coordinate", &self.coordinate.to_string())
            .finish()
    }
}

/// Handles `maven://<coordinates>` locations.
pub struct MavenResourceLoader {
    resolver: Arc<ArtifactResolver>,
}

impl MavenResourceLoader {
    pub fn new(resolver: Arc<ArtifactResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<ArtifactResolver> {
        &self.resolver
    }
}

impl ResourceLoader for MavenResourceLoader {
    /// Accepts `maven://g:a:v`, `maven:g:a:v` or bare coordinates.
    fn get_resource(&self, location: &str) -> ResolverResult<Resource> {
        let coords = strip_scheme(location).trim_start_matches('/');
        let coordinate = ArtifactCoordinate::parse(coords)?;
        Ok(Resource::Maven(MavenResource::new(
            coordinate,
            Arc::clone(&self.resolver),
        )))
    }
}

fn strip_scheme(location: &str) -> &str {
    let prefix_len = MAVEN_SCHEME.len() + 1;
    match location.get(..prefix_len) {
        Some(prefix) if prefix.eq_ignore_ascii_case("maven:") => &location[prefix_len..],
        _ => location,
    }
}
