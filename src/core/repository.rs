//! Repository URLs - WHERE remote packages come from.
//!
//! Xcode stores the URL exactly as the user typed it, which is often the
//! scp-like `git@host:org/Repo.git` form rather than an RFC 3986 URL. The raw
//! text is kept for display and a parsed [`Url`] is derived when possible.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A source-control repository location as declared in a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryUrl(String);

impl RepositoryUrl {
    /// Wrap a declared repository location.
    pub fn new(raw: impl Into<String>) -> Self {
        RepositoryUrl(raw.into())
    }

    /// The location exactly as declared.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a [`Url`].
    ///
    /// scp-like locations (`git@github.com:org/Repo.git`) become
    /// `ssh://git@github.com/org/Repo.git`.
    pub fn to_url(&self) -> Option<Url> {
        let raw = self.0.trim();

        if let Some((authority, path)) = split_scp_like(raw) {
            return Url::parse(&format!("ssh://{}/{}", authority, path)).ok();
        }

        Url::parse(raw).ok().filter(|url| url.has_host() || url.scheme() == "file")
    }

    /// Package name implied by the location: the last path component
    /// without a `.git` suffix.
    pub fn package_name(&self) -> Option<&str> {
        let trimmed = self.0.trim().trim_end_matches('/');
        let last = trimmed.rsplit(['/', ':']).next()?;
        let name = last.strip_suffix(".git").unwrap_or(last);

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Comparison key that ignores scheme, user, letter case, a trailing
    /// `/` and a `.git` suffix.
    ///
    /// `https://github.com/org/Repo` and `git@github.com:org/repo.git` share
    /// the key `github.com/org/repo`.
    pub fn canonical(&self) -> String {
        let (host, path) = match self.to_url() {
            Some(url) => (
                url.host_str().unwrap_or_default().to_string(),
                url.path().to_string(),
            ),
            None => (String::new(), self.0.trim().to_string()),
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let key = if host.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", host, path)
        };
        key.to_lowercase()
    }

    /// Whether two declarations point at the same repository.
    pub fn same_repository(&self, other: &RepositoryUrl) -> bool {
        self.canonical() == other.canonical()
    }
}

/// Split `user@host:path` into (`user@host`, `path`).
fn split_scp_like(raw: &str) -> Option<(&str, &str)> {
    if raw.contains("://") {
        return None;
    }

    let (authority, path) = raw.split_once(':')?;
    if authority.is_empty() || authority.contains('/') || path.starts_with("//") {
        return None;
    }

    // A bare `scheme:rest` (e.g. `file:foo`) has no host-like authority
    if !authority.contains('@') && !authority.contains('.') {
        return None;
    }

    Some((authority, path.trim_start_matches('/')))
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepositoryUrl {
    fn from(raw: &str) -> Self {
        RepositoryUrl::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_from_https() {
        let url = RepositoryUrl::new("https://github.com/simonbs/Runestone");
        assert_eq!(url.package_name(), Some("Runestone"));

        let url = RepositoryUrl::new("https://github.com/simonbs/Runestone.git/");
        assert_eq!(url.package_name(), Some("Runestone"));
    }

    #[test]
    fn test_package_name_from_scp_like() {
        let url = RepositoryUrl::new("git@github.com:simonbs/TreeSitterLanguages.git");
        assert_eq!(url.package_name(), Some("TreeSitterLanguages"));

        let url = RepositoryUrl::new("git@github.com:Bare.git");
        assert_eq!(url.package_name(), Some("Bare"));
    }

    #[test]
    fn test_package_name_empty() {
        assert_eq!(RepositoryUrl::new("").package_name(), None);
        assert_eq!(RepositoryUrl::new(".git").package_name(), None);
    }

    #[test]
    fn test_scp_like_to_url() {
        let url = RepositoryUrl::new("git@github.com:simonbs/TreeSitterLanguages.git")
            .to_url()
            .unwrap();
        assert_eq!(url.scheme(), "ssh");
        assert_eq!(url.username(), "git");
        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/simonbs/TreeSitterLanguages.git");
    }

    #[test]
    fn test_canonical_matches_across_forms() {
        let https = RepositoryUrl::new("https://github.com/simonbs/TreeSitterLanguages");
        let ssh = RepositoryUrl::new("git@github.com:simonbs/treesitterlanguages.git");
        let other = RepositoryUrl::new("https://github.com/simonbs/Runestone");

        assert_eq!(https.canonical(), "github.com/simonbs/treesitterlanguages");
        assert!(https.same_repository(&ssh));
        assert!(!https.same_repository(&other));
    }

    #[test]
    fn test_display_keeps_raw_text() {
        let raw = "git@github.com:simonbs/TreeSitterLanguages.git";
        assert_eq!(RepositoryUrl::new(raw).to_string(), raw);
    }
}
