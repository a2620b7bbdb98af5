//! URL allow-lists for navigation and external-intent policy.

use serde::{Deserialize, Serialize};

/// An ordered list of permitted URL prefixes.
///
/// Matching is prefix-based: `https://app.example/` permits every URL
/// below that origin. A single `*` entry permits everything. An empty
/// list permits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    patterns: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether `url` matches any configured prefix.
    pub fn allows(&self, url: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern == "*" || url.starts_with(pattern.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav_list() -> AllowList {
        AllowList::new(["https://app.example/", "gantry://", "about:blank"])
    }

    // -- Allowed URLs --

    #[test]
    fn allows_exact_prefix() {
        let list = nav_list();
        assert!(list.allows("https://app.example/index.html"));
        assert!(list.allows("https://app.example/deep/path?q=1"));
        assert!(list.allows("gantry://localhost/panel.html"));
    }

    #[test]
    fn allows_about_blank() {
        assert!(nav_list().allows("about:blank"));
    }

    #[test]
    fn wildcard_allows_everything() {
        let list = AllowList::new(["*"]);
        assert!(list.allows("https://anything.example/"));
        assert!(list.allows("ftp://files.example.com"));
    }

    // -- Blocked URLs --

    #[test]
    fn blocks_arbitrary_https() {
        let list = nav_list();
        assert!(!list.allows("https://evil.com"));
        assert!(!list.allows("https://app.example.evil.com/"));
    }

    #[test]
    fn blocks_scheme_tricks() {
        let list = nav_list();
        assert!(!list.allows("javascript:alert(1)"));
        assert!(!list.allows("data:text/html,<h1>x</h1>"));
        assert!(!list.allows("file:///etc/passwd"));
    }

    #[test]
    fn empty_list_blocks_everything() {
        let list = AllowList::default();
        assert!(list.is_empty());
        assert!(!list.allows("https://app.example/"));
        assert!(!list.allows("about:blank"));
    }

    #[test]
    fn toml_roundtrip_is_a_bare_array() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            allow: AllowList,
        }
        let wrapper: Wrapper = toml::from_str(r#"allow = ["https://a/", "*"]"#).unwrap();
        assert_eq!(wrapper.allow.patterns(), ["https://a/", "*"]);
        assert!(wrapper.allow.allows("anything"));
    }
}
