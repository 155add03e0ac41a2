use std::path::PathBuf;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::artifact::ArtifactCoordinate;
use super::cache::LocalRepository;
use crate::core::config::{RemoteRepository, ResolutionConfig};
use crate::core::downloader::{HttpTransport, Transport};
use crate::core::error::{ResolverError, ResolverResult, UnresolvableReason};

/// Default parallelism for [`ArtifactResolver::resolve_all`].
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Resolves artifacts against the local repository first, then the
/// configured remotes in order.
pub struct ArtifactResolver {
    config: ResolutionConfig,
    local: LocalRepository,
    transport: Arc<dyn Transport>,
    concurrency: usize,
}

impl ArtifactResolver {
    /// Resolver backed by the default HTTP transport.
    pub fn new(config: ResolutionConfig) -> ResolverResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ResolutionConfig, transport: Arc<dyn Transport>) -> Self {
        let local = LocalRepository::new(config.local_repository());
        Self {
            config,
            local,
            transport,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    pub fn local_repository(&self) -> &LocalRepository {
        &self.local
    }

    /// Whether the artifact is already in the local cache. Never touches
    /// the network.
    pub async fn exists(&self, artifact: &ArtifactCoordinate) -> bool {
        self.local.find(artifact).await.is_some()
    }

    /// Produce a local file for `artifact`.
    ///
    /// A cache hit is returned as-is; remotes are only consulted on a miss
    /// and only when online.
    pub async fn resolve(&self, artifact: &ArtifactCoordinate) -> ResolverResult<PathBuf> {
        if let Some(path) = self.local.find(artifact).await {
            debug!("Cache hit for {}: {:?}", artifact, path);
            return Ok(path);
        }

        if self.config.offline() {
            warn!("{} is not cached and resolver is offline", artifact);
            return Err(unresolvable(artifact, UnresolvableReason::Offline));
        }

        for repo in self.config.remote_repositories() {
            match self.fetch_from(repo, artifact).await {
                Ok(bytes) => {
                    let path = self.local.store(artifact, &bytes).await?;
                    info!("Resolved {} from {}", artifact, repo.url());
                    return Ok(path);
                }
                Err(e) => {
                    debug!("Repository {} failed for {}: {}", repo.url(), artifact, e);
                }
            }
        }

        warn!(
            "Could not resolve {} from {} remote repositories",
            artifact,
            self.config.remote_repositories().len()
        );
        Err(unresolvable(artifact, UnresolvableReason::ExhaustedRemotes))
    }

    /// Parse `coord` and resolve it.
    pub async fn resolve_str(&self, coord: &str) -> ResolverResult<PathBuf> {
        let artifact = ArtifactCoordinate::parse(coord)?;
        self.resolve(&artifact).await
    }

    /// Resolve several artifacts concurrently. Results are returned in input
    /// order.
    pub async fn resolve_all(
        &self,
        artifacts: &[ArtifactCoordinate],
    ) -> Vec<ResolverResult<PathBuf>> {
        info!(
            "Resolving {} artifacts, concurrency={}",
            artifacts.len(),
            self.concurrency
        );

        stream::iter(artifacts)
            .map(|artifact| self.resolve(artifact))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn fetch_from(
        &self,
        repo: &RemoteRepository,
        artifact: &ArtifactCoordinate,
    ) -> ResolverResult<Vec<u8>> {
        let url = artifact.url(repo.url());
        debug!("Fetching {}", url);
        self.transport.fetch(&url, repo.credentials()).await
    }
}

fn unresolvable(artifact: &ArtifactCoordinate, reason: UnresolvableReason) -> ResolverError {
    ResolverError::Unresolvable {
        coordinate: artifact.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Credentials;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory transport that records every requested URL.
    #[derive(Default)]
    struct RecordingTransport {
        bodies: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        fn serving(url: &str, body: &[u8]) -> Self {
            let mut t = Self::default();
            t.bodies.insert(url.to_string(), body.to_vec());
            t
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn fetch(
            &self,
            url: &str,
            _credentials: Option<&Credentials>,
        ) -> ResolverResult<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| ResolverError::DownloadFailed {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn resolver(
        local: &std::path::Path,
        remotes: &[&str],
        offline: bool,
        transport: Arc<RecordingTransport>,
    ) -> ArtifactResolver {
        let config =
            ResolutionConfig::new(Some(local.to_path_buf()), remotes.iter().copied(), offline)
                .unwrap();
        ArtifactResolver::with_transport(config, transport)
    }

    fn org_foo_bar() -> ArtifactCoordinate {
        ArtifactCoordinate::new("org.foo", "bar", "1.0").unwrap()
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::serving(
            "https://example.test/repo/org/foo/bar/1.0/bar-1.0.jar",
            b"jar-bytes",
        ));
        let resolver = resolver(
            temp.path(),
            &["https://example.test/repo"],
            false,
            transport.clone(),
        );

        let path = resolver.resolve(&org_foo_bar()).await.unwrap();
        assert_eq!(path, temp.path().join("org/foo/bar/1.0/bar-1.0.jar"));
        assert_eq!(std::fs::read(&path).unwrap(), b"jar-bytes");
        assert_eq!(
            transport.calls(),
            vec!["https://example.test/repo/org/foo/bar/1.0/bar-1.0.jar".to_string()]
        );

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let again = resolver.resolve(&org_foo_bar()).await.unwrap();
        assert_eq!(again, path);
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(std::fs::metadata(&again).unwrap().modified().unwrap(), modified);
    }

    #[tokio::test]
    async fn cache_hit_never_contacts_remotes() {
        let temp = tempfile::tempdir().unwrap();
        let cached = temp.path().join("org/foo/bar/1.0/bar-1.0.jar");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"cached").unwrap();

        let transport = Arc::new(RecordingTransport::default());
        let resolver = resolver(
            temp.path(),
            &["http://127.0.0.1:1/unreachable", "https://nowhere.invalid/repo"],
            false,
            transport.clone(),
        );

        assert_eq!(resolver.resolve(&org_foo_bar()).await.unwrap(), cached);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn offline_miss_is_unresolvable_without_inspecting_remotes() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::serving(
            "https://example.test/repo/org/foo/bar/1.0/bar-1.0.jar",
            b"jar-bytes",
        ));
        let resolver = resolver(
            temp.path(),
            &["https://example.test/repo"],
            true,
            transport.clone(),
        );

        let err = resolver.resolve(&org_foo_bar()).await.unwrap_err();
        assert_eq!(err.unresolvable_reason(), Some(UnresolvableReason::Offline));
        assert!(transport.calls().is_empty());
        assert!(!temp.path().join("org").exists());
    }

    #[tokio::test]
    async fn online_with_no_remotes_is_unresolvable() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let resolver = resolver(temp.path(), &[], false, transport.clone());

        let err = resolver.resolve(&org_foo_bar()).await.unwrap_err();
        assert_eq!(
            err.unresolvable_reason(),
            Some(UnresolvableReason::ExhaustedRemotes)
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn remotes_are_tried_in_order_until_one_succeeds() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::serving(
            "https://second.test/maven2/example/foo/1.0.1/foo-1.0.1-exec.jar",
            b"exec",
        ));
        let resolver = resolver(
            temp.path(),
            &[
                "https://first.test/repo/",
                "https://second.test/maven2",
                "https://third.test/repo",
            ],
            false,
            transport.clone(),
        );

        let path = resolver.resolve_str("example:foo:jar:exec:1.0.1").await.unwrap();
        assert!(path.ends_with("example/foo/1.0.1/foo-1.0.1-exec.jar"));
        assert_eq!(
            transport.calls(),
            vec![
                "https://first.test/repo/example/foo/1.0.1/foo-1.0.1-exec.jar".to_string(),
                "https://second.test/maven2/example/foo/1.0.1/foo-1.0.1-exec.jar".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn escaping_coordinates_never_reach_transport_or_disk() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("m2");
        let transport = Arc::new(RecordingTransport::default());
        let resolver = resolver(&root, &["https://example.test/repo"], false, transport.clone());

        let absolute = format!("g:{}:1", temp.path().display());
        for coord in ["g:..:..", "..:a:1.0", "g:a:jar:../../x:1.0", absolute.as_str()] {
            let err = resolver.resolve_str(coord).await.unwrap_err();
            assert!(
                matches!(err, ResolverError::InvalidCoordinate { .. }),
                "{coord:?}"
            );
        }
        assert!(transport.calls().is_empty());
        assert!(!root.exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn resolved_paths_stay_under_the_local_root() {
        let temp = tempfile::tempdir().unwrap();
        let mut transport = RecordingTransport::default();
        for coord in ["org.foo:bar..baz:1.0..RC1", "a.b.c:d:zip:dist:2"] {
            let url = ArtifactCoordinate::parse(coord)
                .unwrap()
                .url("https://example.test/repo");
            transport.bodies.insert(url, b"x".to_vec());
        }
        let resolver = resolver(
            temp.path(),
            &["https://example.test/repo"],
            false,
            Arc::new(transport),
        );

        for coord in ["org.foo:bar..baz:1.0..RC1", "a.b.c:d:zip:dist:2"] {
            let path = resolver.resolve_str(coord).await.unwrap();
            assert!(path.starts_with(temp.path()), "{path:?}");
            assert_eq!(std::fs::read(&path).unwrap(), b"x");
        }
    }

    #[tokio::test]
    async fn transport_errors_fall_through_to_the_next_remote() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // Bound then dropped, so connecting is refused.
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_addr = closed.local_addr().unwrap();
        drop(closed);

        let live = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live_addr = live.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = live.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\njar")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        let temp = tempfile::tempdir().unwrap();
        let config = ResolutionConfig::new(
            Some(temp.path().to_path_buf()),
            [
                format!("http://{}/repo", closed_addr),
                format!("http://{}/repo", live_addr),
            ],
            false,
        )
        .unwrap();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let resolver =
            ArtifactResolver::with_transport(config, Arc::new(HttpTransport::with_client(client)));

        let path = resolver.resolve(&org_foo_bar()).await.unwrap();
        assert_eq!(path, temp.path().join("org/foo/bar/1.0/bar-1.0.jar"));
        assert_eq!(std::fs::read(&path).unwrap(), b"jar");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /repo/org/foo/bar/1.0/bar-1.0.jar HTTP/1.1"));
    }

    #[tokio::test]
    async fn exhausted_remotes_leave_nothing_in_the_cache() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let resolver = resolver(
            temp.path(),
            &["https://a.test/repo", "https://b.test/repo"],
            false,
            transport.clone(),
        );

        let err = resolver.resolve(&org_foo_bar()).await.unwrap_err();
        assert!(err.is_unresolvable());
        assert_eq!(transport.calls().len(), 2);
        assert!(!temp.path().join("org").exists());
        assert!(!resolver.exists(&org_foo_bar()).await);
    }

    #[tokio::test]
    async fn exists_reports_cache_presence_only() {
        let temp = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::serving(
            "https://example.test/repo/org/foo/bar/1.0/bar-1.0.jar",
            b"jar-bytes",
        ));
        let resolver = resolver(
            temp.path(),
            &["https://example.test/repo"],
            false,
            transport.clone(),
        );

        assert!(!resolver.exists(&org_foo_bar()).await);
        assert!(transport.calls().is_empty());

        resolver.resolve(&org_foo_bar()).await.unwrap();
        assert!(resolver.exists(&org_foo_bar()).await);
    }

    #[tokio::test]
    async fn cached_after_online_resolve_then_usable_offline() {
        let temp = tempfile::tempdir().unwrap();
        let coord = ArtifactCoordinate::parse(
            "org.springframework.cloud.task.app:timestamp-task:jar:1.0.0.BUILD-SNAPSHOT",
        )
        .unwrap();
        let online = Arc::new(RecordingTransport::serving(
            &coord.url("https://repo.test/libs-snapshot-local"),
            b"snapshot",
        ));
        resolver(
            temp.path(),
            &["https://repo.test/libs-snapshot-local"],
            false,
            online,
        )
        .resolve(&coord)
        .await
        .unwrap();

        let offline = Arc::new(RecordingTransport::default());
        let path = resolver(temp.path(), &[], true, offline.clone())
            .resolve(&coord)
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "timestamp-task-1.0.0.BUILD-SNAPSHOT.jar");
        assert!(offline.calls().is_empty());
    }

    #[tokio::test]
    async fn resolve_all_keeps_input_order() {
        let temp = tempfile::tempdir().unwrap();
        let mut transport = RecordingTransport::default();
        transport.bodies.insert(
            "https://example.test/repo/g/one/1/one-1.jar".into(),
            b"one".to_vec(),
        );
        transport.bodies.insert(
            "https://example.test/repo/g/three/3/three-3.jar".into(),
            b"three".to_vec(),
        );
        let resolver = resolver(
            temp.path(),
            &["https://example.test/repo"],
            false,
            Arc::new(transport),
        )
        .with_concurrency(2);

        let coords: Vec<_> = ["g:one:1", "g:two:2", "g:three:3"]
            .iter()
            .map(|c| ArtifactCoordinate::parse(c).unwrap())
            .collect();
        let results = resolver.resolve_all(&coords).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().ends_with("g/one/1/one-1.jar"));
        assert!(results[1].as_ref().unwrap_err().is_unresolvable());
        assert!(results[2].as_ref().unwrap().ends_with("g/three/3/three-3.jar"));
    }
}
