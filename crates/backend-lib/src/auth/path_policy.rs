// ============================
// crates/backend-lib/src/auth/path_policy.rs
// ============================
//! Which request paths bypass authentication.
use std::collections::HashSet;

/// Decide whether `path` needs authentication against an exclusion set.
///
/// A path and the same path with one trailing `/` are the same entry, in
/// both directions. A missing or empty path, or an empty set, always
/// requires authentication.
pub fn requires_auth(path: Option<&str>, excluded: &HashSet<String>) -> bool {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return true;
    };
    if excluded.is_empty() {
        return true;
    }
    if excluded.contains(path) {
        return false;
    }
    let twin = match path.strip_suffix('/') {
        // `/a//` is not `/a/`
        Some(stripped) if stripped.is_empty() || stripped.ends_with('/') => return true,
        Some(stripped) => stripped.to_string(),
        None => format!("{path}/"),
    };
    !excluded.contains(&twin)
}

/// A configured exclusion set
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    excluded: HashSet<String>,
}

impl PathPolicy {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    pub fn requires_auth(&self, path: &str) -> bool {
        requires_auth(Some(path), &self.excluded)
    }

    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_slash_tolerant_membership() {
        let excluded = set(&["/status/"]);
        assert!(!requires_auth(Some("/status"), &excluded));
        assert!(!requires_auth(Some("/status/"), &excluded));

        let excluded = set(&["/status"]);
        assert!(!requires_auth(Some("/status"), &excluded));
        assert!(!requires_auth(Some("/status/"), &excluded));
    }

    #[test]
    fn test_only_one_slash_is_tolerated() {
        let excluded = set(&["/status/"]);
        assert!(requires_auth(Some("/status//"), &excluded));
        assert!(requires_auth(Some("/statusx"), &excluded));
        assert!(requires_auth(Some("/status/extra"), &excluded));
        assert!(requires_auth(Some("/STATUS/"), &excluded));

        let excluded = set(&["/status"]);
        assert!(requires_auth(Some("/status//"), &excluded));

        let excluded = set(&["/status/", "/"]);
        assert!(requires_auth(Some("/status///"), &excluded));
        assert!(requires_auth(Some("//"), &excluded));
    }

    #[test]
    fn test_conservative_defaults() {
        let excluded = set(&["/status/"]);
        assert!(requires_auth(None, &excluded));
        assert!(requires_auth(Some(""), &excluded));

        let empty = HashSet::new();
        assert!(requires_auth(Some("/status/"), &empty));
        assert!(requires_auth(Some("/"), &empty));
    }

    #[test]
    fn test_root_path() {
        let excluded = set(&["/"]);
        assert!(!requires_auth(Some("/"), &excluded));
        assert!(requires_auth(Some("/profile"), &excluded));
    }

    #[test]
    fn test_policy_wrapper() {
        let policy = PathPolicy::new(["/users/", "/sessions"]);
        assert!(!policy.requires_auth("/users"));
        assert!(!policy.requires_auth("/sessions/"));
        assert!(policy.requires_auth("/profile"));
        assert_eq!(policy.excluded().len(), 2);

        assert!(PathPolicy::default().requires_auth("/users"));
    }
}
