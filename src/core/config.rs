use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{ResolverError, ResolverResult};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Username/password pair forwarded to a repository as HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// A remote repository base URL, optionally with credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    url: String,
    credentials: Option<Credentials>,
}

impl RemoteRepository {
    pub fn new(url: impl Into<String>) -> ResolverResult<Self> {
        let url = url.into();
        let trimmed = url.trim();
        let has_host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .map(|rest| !rest.trim_matches('/').is_empty())
            .unwrap_or(false);
        if !has_host {
            return Err(ResolverError::Config(format!(
                "remote repository must be an http(s) URL: '{}'",
                url
            )));
        }
        Ok(Self {
            url: trimmed.to_string(),
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, username: &str, password: Option<&str>) -> Self {
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.map(str::to_string),
        });
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Immutable resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    local_repository: PathBuf,
    remote_repositories: Vec<RemoteRepository>,
    offline: bool,
    request_timeout: Duration,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            local_repository: default_local_repository(),
            remote_repositories: Vec::new(),
            offline: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ResolutionConfig {
    /// Validate and build a configuration. `None` selects the per-user
    /// `~/.m2/repository`.
    pub fn new<I, S>(
        local_repository: Option<PathBuf>,
        remote_urls: I,
        offline: bool,
    ) -> ResolverResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let remote_repositories = remote_urls
            .into_iter()
            .map(RemoteRepository::new)
            .collect::<ResolverResult<Vec<_>>>()?;
        Self::from_repositories(local_repository, remote_repositories, offline)
    }

    /// Like [`ResolutionConfig::new`] but with pre-built repositories, e.g.
    /// ones carrying credentials.
    pub fn from_repositories(
        local_repository: Option<PathBuf>,
        remote_repositories: Vec<RemoteRepository>,
        offline: bool,
    ) -> ResolverResult<Self> {
        let local_repository = match local_repository {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(ResolverError::Config(
                    "local repository path must not be empty".into(),
                ))
            }
            Some(path) => path,
            None => default_local_repository(),
        };

        Ok(Self {
            local_repository,
            remote_repositories,
            offline,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parse a JSON configuration document.
    ///
    /// ```json
    /// {
    ///   "localRepository": "/var/cache/m2",
    ///   "remoteRepositories": [
    ///     "https://repo1.maven.org/maven2",
    ///     { "url": "https://repo.example.com/private", "username": "ci", "password": "s3cret" }
    ///   ],
    ///   "offline": false,
    ///   "requestTimeoutSecs": 30
    /// }
    /// ```
    pub fn from_json_str(raw: &str) -> ResolverResult<Self> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        let remotes = file
            .remote_repositories
            .into_iter()
            .map(RemoteEntry::into_repository)
            .collect::<ResolverResult<Vec<_>>>()?;

        let config = Self::from_repositories(file.local_repository, remotes, file.offline)?;
        Ok(match file.request_timeout_secs {
            Some(secs) => config.with_request_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }

    /// Load a JSON configuration file from disk.
    pub fn load(path: &Path) -> ResolverResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ResolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn remote_repositories(&self) -> &[RemoteRepository] {
        &self.remote_repositories
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    local_repository: Option<PathBuf>,
    #[serde(default)]
    remote_repositories: Vec<RemoteEntry>,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl RemoteEntry {
    fn into_repository(self) -> ResolverResult<RemoteRepository> {
        match self {
            RemoteEntry::Url(url) => RemoteRepository::new(url),
            RemoteEntry::Detailed {
                url,
                username,
                password,
            } => {
                let repo = RemoteRepository::new(url)?;
                Ok(match username {
                    Some(user) => repo.with_credentials(&user, password.as_deref()),
                    None => repo,
                })
            }
        }
    }
}

fn default_base_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// The conventional per-user Maven cache, `~/.m2/repository`.
pub fn default_local_repository() -> PathBuf {
    default_base_dir().join(".m2").join("repository")
}
