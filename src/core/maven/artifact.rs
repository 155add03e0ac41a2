use std::fmt;
use std::path::PathBuf;

use crate::core::error::{ResolverError, ResolverResult};

/// Packaging used when a coordinate does not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// A fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:extension:version`
///   `groupId:artifactId:extension:classifier:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    group_id: String,
    artifact_id: String,
    /// File extension / packaging type. Defaults to `"jar"`.
    extension: String,
    /// Empty when the artifact has no classifier.
    classifier: String,
    version: String,
}

impl ArtifactCoordinate {
    /// Build a coordinate from its required parts, with `jar` packaging and
    /// no classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> ResolverResult<Self> {
        let coord = Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: String::new(),
            version: version.into(),
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Parse a colon-delimited coordinate string.
    ///
    /// # Examples
    /// ```
    /// use maven_resource::ArtifactCoordinate;
    ///
    /// let a = ArtifactCoordinate::parse("example:foo:jar:exec:1.0.1").unwrap();
    /// assert_eq!(a.filename(), "foo-1.0.1-exec.jar");
    /// ```
    pub fn parse(coord: &str) -> ResolverResult<Self> {
        let parts: Vec<&str> = coord.split(':').collect();

        let (group_id, artifact_id, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, DEFAULT_EXTENSION, "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => {
                return Err(invalid(
                    coord,
                    format!(
                        "expected 3 to 5 colon-delimited fields, found {}",
                        parts.len()
                    ),
                ))
            }
        };

        let parsed = Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            extension: if extension.is_empty() {
                DEFAULT_EXTENSION.to_string()
            } else {
                extension.to_string()
            },
            classifier: classifier.to_string(),
            version: version.to_string(),
        };
        parsed.validate_as(coord)?;
        Ok(parsed)
    }

    /// Return a copy with the packaging changed (e.g. to `"war"`).
    pub fn with_extension(&self, extension: &str) -> ResolverResult<Self> {
        let mut clone = self.clone();
        clone.extension = extension.to_string();
        clone.validate()?;
        Ok(clone)
    }

    /// Return a copy with the classifier changed. An empty classifier
    /// removes it.
    pub fn with_classifier(&self, classifier: &str) -> ResolverResult<Self> {
        let mut clone = self.clone();
        clone.classifier = classifier.to_string();
        clone.validate()?;
        Ok(clone)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Construct the group path portion (`org/springframework/cloud`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Build the artifact filename.
    ///
    /// `artifactId-version[-classifier].extension`
    pub fn filename(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}-{}.{}", self.artifact_id, self.version, self.extension)
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, self.classifier, self.extension
            )
        }
    }

    /// Repository-relative path using `/` separators, shared by the remote
    /// URL and the local layout.
    ///
    /// `<group_path>/<artifact_id>/<version>/<filename>`
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Construct the full URL for this artifact under the given repository base.
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!("{}/{}", base, self.relative_path())
    }

    /// Local path relative to the repository root, with platform separators.
    pub fn local_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id.split('.').collect();
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.filename());
        path
    }

    fn validate(&self) -> ResolverResult<()> {
        self.validate_as(&self.to_string())
    }

    /// Every field becomes a path segment under the repository root, so
    /// none may contain a separator or be a relative reference.
    fn validate_as(&self, original: &str) -> ResolverResult<()> {
        for (name, value) in [
            ("groupId", &self.group_id),
            ("artifactId", &self.artifact_id),
            ("version", &self.version),
            ("extension", &self.extension),
        ] {
            if value.is_empty() {
                return Err(invalid(original, format!("{name} must not be empty")));
            }
            check_segment(original, name, value)?;
        }
        if !self.classifier.is_empty() {
            check_segment(original, "classifier", &self.classifier)?;
        }
        for segment in self.group_id.split('.') {
            if segment.is_empty() {
                return Err(invalid(original, "groupId has an empty segment"));
            }
        }
        Ok(())
    }
}

fn check_segment(original: &str, name: &str, value: &str) -> ResolverResult<()> {
    if value.contains(['/', '\\', '\0']) {
        return Err(invalid(
            original,
            format!("{name} must not contain path separators"),
        ));
    }
    if value == "." || value == ".." {
        return Err(invalid(original, format!("{name} must not be '{value}'")));
    }
    Ok(())
}

fn invalid(coord: &str, reason: impl Into<String>) -> ResolverError {
    ResolverError::InvalidCoordinate {
        coordinate: coord.to_string(),
        reason: reason.into(),
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classifier.is_empty() {
            write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.version
            )
        } else {
            write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.classifier, self.version
            )
        }
    }
}

impl std::str::FromStr for ArtifactCoordinate {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
