//! Route parameters.
//!
//! A route pattern segment starting with exactly one `:` (and at least one more
//! character) is a named parameter. Matching a pattern against a concrete path
//! binds every parameter name to the path segment at the same position.

use crate::path::{normalize, split};
use std::collections::BTreeMap;

/// True iff `segment` is a `:name` placeholder.
pub fn is_parameter(segment: &str) -> bool {
    match segment.strip_prefix(':') {
        Some(name) => !name.is_empty() && !name.starts_with(':'),
        None => false,
    }
}

/// True iff any segment of `route` is a placeholder.
pub fn has_parameter(route: &str) -> bool {
    split(route).into_iter().any(is_parameter)
}

/// Match a route pattern against a concrete path.
///
/// Segment counts must be equal; placeholders match any segment, literal
/// segments must be byte-equal.
pub fn matches(route: &str, path: &str) -> bool {
    let route_parts = split(route);
    let path_parts = split(path);
    route_parts.len() == path_parts.len()
        && route_parts
            .iter()
            .zip(path_parts.iter())
            .all(|(r, p)| is_parameter(r) || r == p)
}

/// Number of literal (non-placeholder) segments in a route. Used to rank
/// parameterized routes by specificity.
pub(crate) fn literal_segments(route: &str) -> usize {
    split(route).into_iter().filter(|s| !is_parameter(s)).count()
}

/// Parameter values bound by one successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    params: BTreeMap<String, String>,
    path: String,
}

impl Parameter {
    /// No bindings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind the placeholders of `route` to the segments of `path`.
    ///
    /// Returns `None` if `route` does not match `path`.
    pub fn extract(route: &str, path: &str) -> Option<Self> {
        if !matches(route, path) {
            return None;
        }
        let params = split(route)
            .into_iter()
            .zip(split(path))
            .filter_map(|(r, p)| {
                r.strip_prefix(':')
                    .filter(|_| is_parameter(r))
                    .map(|name| (name.to_string(), p.to_string()))
            })
            .collect();
        Some(Self {
            params,
            path: normalize(path),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// The concrete (normalized) path the values were taken from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_parameter() {
        for segment in ["", " ", ":", "::", ":::", "a", "a:", "a:b", "a:b:"] {
            assert!(!is_parameter(segment), "{segment:?} is not a parameter");
        }
        assert!(is_parameter(":a"));
        assert!(is_parameter(":a:b"));
    }

    #[test]
    fn test_has_parameter() {
        for route in [
            "", " ", "/", ":", "::", ":::", ":/", "/:", ":/:/:", "a", "a:", "a:b", "a:b:", "/a/b/c",
        ] {
            assert!(!has_parameter(route), "{route:?} has no parameter");
        }
        for route in [":a", ":a:b", ":a/", "/:a", ":a/b", "/:a/b", "/a/:b/c", "/:a/:b/:c"] {
            assert!(has_parameter(route), "{route:?} has a parameter");
        }
    }

    #[test]
    fn test_matches() {
        assert!(!matches("/a/:b/c", ""));
        assert!(!matches("/a/:b/c", "foo"));
        assert!(!matches("/a/:b/c", "/a"));
        assert!(!matches("/a/:b/c", "/a/b"));
        assert!(!matches("/a/:b/c", "/a/b/c/d"));
        assert!(!matches("/a/:b/c", "/A/b/c"));
        assert!(matches("/:a", "/value0"));
        assert!(matches("/:a/b/:c", "/value0/b/value1"));
        assert!(matches("/", ""));
    }

    #[test]
    fn test_extract() {
        let parameter = Parameter::extract("/:a/b/:c", "/value0/b/value1/").unwrap();
        assert_eq!(parameter.len(), 2);
        assert_eq!(parameter.get("a"), Some("value0"));
        assert_eq!(parameter.get("c"), Some("value1"));
        assert!(!parameter.has("b"));
        assert_eq!(parameter.get_or("missing", "x"), "x");
        assert_eq!(parameter.path(), "/value0/b/value1");

        let single = Parameter::extract(":a", "/value0").unwrap();
        assert_eq!(single.get("a"), Some("value0"));
    }

    #[test]
    fn test_extract_binds_every_placeholder() {
        let cases = [
            ("/records/:from/:to", "/records/1960/1970"),
            ("/record/:id", "/record/42"),
            ("/:x/:y/:z", "/1/2/3"),
        ];
        for (route, path) in cases {
            let parameter = Parameter::extract(route, path).unwrap();
            let placeholders = split(route).into_iter().filter(|s| is_parameter(s)).count();
            assert_eq!(parameter.len(), placeholders);
            for (r, p) in split(route).into_iter().zip(split(path)) {
                if is_parameter(r) {
                    assert_eq!(parameter.get(&r[1..]), Some(p));
                }
            }
        }
    }

    #[test]
    fn test_extract_mismatch() {
        assert!(Parameter::extract("/record/:id", "/records/42").is_none());
        assert!(Parameter::extract("/record/:id", "/record").is_none());
        assert!(Parameter::empty().is_empty());
    }

    #[test]
    fn test_literal_segments() {
        assert_eq!(literal_segments("/records/:id"), 1);
        assert_eq!(literal_segments("/:a/:b"), 0);
        assert_eq!(literal_segments("/a/b/c"), 3);
    }
}
