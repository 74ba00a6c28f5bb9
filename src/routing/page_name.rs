//! Page name resolution.
//!
//! # Responsibilities
//! - Derive the candidate page identifier from a request path
//! - Validate it against the page registry
//! - Produce the base href for the shell document
//!
//! # Design Decisions
//! - Pure function: same path and registry answer → same base href
//! - Only the first two segments form an identifier; deeper paths are
//!   client-side routes inside that page
//! - Unknown identifiers fall back to the root page, never an error

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;

use crate::pages::PageRegistry;

/// The `href` written into the shell's `<base>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseHref(String);

impl BaseHref {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn for_page(identifier: &str) -> Self {
        Self(format!("/{identifier}/"))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseHref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-decode a URL path. `None` when the decoded bytes are not UTF-8.
///
/// Malformed escapes such as `%zz` are kept literally.
pub fn decode_path(path: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(path).decode_utf8().ok()
}

/// First two segments of `path` joined by `/`, when there are at least two.
pub fn candidate_identifier(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let mut segments = trimmed.split('/');
    match (segments.next(), segments.next()) {
        (Some(first), Some(second)) => Some(format!("{first}/{second}")),
        _ => None,
    }
}

/// Resolve `path` to a base href using `known_page` as the registry check.
pub fn resolve<F>(path: &str, known_page: F) -> BaseHref
where
    F: Fn(&str) -> bool,
{
    match candidate_identifier(path) {
        Some(candidate) if known_page(&candidate) => BaseHref::for_page(&candidate),
        Some(candidate) => {
            tracing::debug!(path = %path, candidate = %candidate, "Unknown page, using root");
            BaseHref::root()
        }
        None => BaseHref::root(),
    }
}

/// [`resolve`] against a [`PageRegistry`].
pub fn resolve_page(path: &str, registry: &dyn PageRegistry) -> BaseHref {
    resolve(path, |candidate| registry.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escaped_paths() {
        assert_eq!(decode_path("/my%20app/main/x").unwrap(), "/my app/main/x");
        assert_eq!(decode_path("/plain/path").unwrap(), "/plain/path");
        assert_eq!(decode_path("/bad%zz").unwrap(), "/bad%zz");
        assert!(decode_path("/%ff").is_none());
    }
    use crate::pages::InMemoryPageRegistry;

    fn known(name: &'static str) -> impl Fn(&str) -> bool {
        move |candidate: &str| candidate == name
    }

    #[test]
    fn short_paths_resolve_to_root() {
        for path in ["", "/", "//", "/dashboard", "dashboard/", "/dashboard/"] {
            assert_eq!(resolve(path, |_| true), BaseHref::root(), "path {path:?}");
        }
    }

    #[test]
    fn unknown_candidates_resolve_to_root() {
        for path in ["/unknown/thing", "/unknown/thing/extra", "/Dashboard/settings"] {
            assert_eq!(resolve(path, known("dashboard/settings")), BaseHref::root());
        }
    }

    #[test]
    fn known_candidates_resolve_to_page() {
        let expected = BaseHref::for_page("dashboard/settings");
        for path in [
            "/dashboard/settings",
            "/dashboard/settings/",
            "/dashboard/settings/extra",
            "dashboard/settings/extra/deeper",
        ] {
            assert_eq!(resolve(path, known("dashboard/settings")), expected);
        }
        assert_eq!(expected.as_str(), "/dashboard/settings/");
    }

    #[test]
    fn lookup_receives_only_two_segments() {
        let seen = std::cell::RefCell::new(Vec::new());
        resolve("/a/b/c/d", |candidate| {
            seen.borrow_mut().push(candidate.to_string());
            false
        });
        assert_eq!(seen.into_inner(), vec!["a/b".to_string()]);
    }

    #[test]
    fn interior_empty_segment_is_kept() {
        assert_eq!(candidate_identifier("/a//b"), Some("a/".to_string()));
        assert_eq!(resolve("/a//b", known("a/b")), BaseHref::root());
    }

    #[test]
    fn resolves_against_registry() {
        let registry = InMemoryPageRegistry::from_names(["myapp/main"]);
        assert_eq!(
            resolve_page("/myapp/main/settings", &registry).to_string(),
            "/myapp/main/"
        );
        assert!(resolve_page("/myapp/other", &registry).is_root());
    }
}
