use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{Resource, ResourceLoader};
use crate::core::error::{ResolverError, ResolverResult};

/// A location split at its URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeSplit<'a> {
    pub scheme: &'a str,
    /// Everything after the `:`.
    pub rest: &'a str,
}

/// Extract the RFC 3986 scheme from `location`.
///
/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub fn split_scheme(location: &str) -> ResolverResult<SchemeSplit<'_>> {
    let invalid = |reason: &str| ResolverError::InvalidLocation {
        location: location.to_string(),
        reason: reason.to_string(),
    };

    if location.is_empty() {
        return Err(invalid("empty location"));
    }
    if let Some(c) = location.chars().find(|c| is_illegal_uri_char(*c)) {
        return Err(invalid(&format!("illegal character {:?}", c)));
    }

    // A '/', '?' or '#' before the first ':' means a relative reference.
    let colon = match location.find([':', '/', '?', '#']) {
        Some(idx) if location.as_bytes()[idx] == b':' => idx,
        _ => return Err(ResolverError::MissingScheme(location.to_string())),
    };

    let scheme = &location[..colon];
    let rest = &location[colon + 1..];

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        Some(_) => return Err(invalid("scheme must start with a letter")),
        None => return Err(invalid("expected scheme name")),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return Err(invalid("illegal character in scheme name"));
    }
    if rest.is_empty() {
        return Err(invalid("expected scheme-specific part"));
    }

    Ok(SchemeSplit { scheme, rest })
}

fn is_illegal_uri_char(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(c, '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
}

/// Routes a location to the loader registered for its scheme.
///
/// Holds no state beyond the loader map; results are returned unchanged.
#[derive(Clone)]
pub struct DelegatingResourceLoader {
    loaders: HashMap<String, Arc<dyn ResourceLoader>>,
}

impl DelegatingResourceLoader {
    /// Fails when `loaders` is empty. Scheme keys are matched
    /// case-insensitively.
    pub fn new<I, S>(loaders: I) -> ResolverResult<Self>
    where
        I: IntoIterator<Item = (S, Arc<dyn ResourceLoader>)>,
        S: AsRef<str>,
    {
        let loaders: HashMap<_, _> = loaders
            .into_iter()
            .map(|(scheme, loader)| (scheme.as_ref().to_ascii_lowercase(), loader))
            .collect();

        if loaders.is_empty() {
            return Err(ResolverError::NoLoadersConfigured);
        }
        Ok(Self { loaders })
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}

impl ResourceLoader for DelegatingResourceLoader {
    fn get_resource(&self, location: &str) -> ResolverResult<Resource> {
        let SchemeSplit { scheme, .. } = split_scheme(location)?;
        let loader = self
            .loaders
            .get(&scheme.to_ascii_lowercase())
            .ok_or_else(|| ResolverError::NoLoader(scheme.to_string()))?;

        debug!("Routing {} to '{}' loader", location, scheme);
        loader.get_resource(location)
    }
}
