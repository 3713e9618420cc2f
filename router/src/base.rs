use crate::path::{normalize, split};

/// The prefix an application is served from.
///
/// Stored in bare segment form (`a/b`): no leading or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Base {
    base: String,
}

impl Base {
    pub fn new(prefix: &str) -> Self {
        Self {
            base: split(prefix).join("/"),
        }
    }

    /// The bare prefix, e.g. `a/b`. Empty if unset.
    pub fn prefix(&self) -> &str {
        &self.base
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Strip the base from an absolute location. The location is normalized
    /// first; relative paths and paths outside the base are not stripped.
    pub fn relative(&self, path: &str) -> String {
        if !path.starts_with('/') {
            return path.to_string();
        }
        let path = normalize(path);
        if self.is_empty() {
            return path;
        }
        if let Some(rest) = path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(self.base.as_str()))
        {
            if rest.is_empty() {
                return "/".to_string();
            }
            if rest.starts_with('/') {
                return rest.to_string();
            }
        }
        path
    }

    /// Prefix `path` with the base, joined by exactly one `/`.
    pub fn absolute(&self, path: &str) -> String {
        if self.is_empty() {
            return path.to_string();
        }
        match path.trim_start_matches('/') {
            "" => format!("/{}", self.base),
            rest => format!("/{}/{}", self.base, rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix() {
        assert_eq!(Base::new("").prefix(), "");
        assert_eq!(Base::new("/").prefix(), "");
        assert_eq!(Base::new("a").prefix(), "a");
        assert_eq!(Base::new("/a").prefix(), "a");
        assert_eq!(Base::new("a/b").prefix(), "a/b");
        assert_eq!(Base::new("/a/b/").prefix(), "a/b");
    }

    #[test]
    fn test_noop() {
        for prefix in ["", "/", "a", "/a", "/a/b/c"] {
            assert_eq!(Base::new(prefix).relative("foo"), "foo");
        }
        assert_eq!(Base::new("/a").relative("/ab/c"), "/ab/c");
    }

    #[test]
    fn test_relative() {
        let empty = Base::new("/");
        assert_eq!(empty.relative("/a"), "/a");
        assert_eq!(empty.relative("/a/b/c"), "/a/b/c");

        let simple = Base::new("/a");
        assert_eq!(simple.relative("/a"), "/");
        assert_eq!(simple.relative("/a/b"), "/b");
        assert_eq!(simple.relative("/a/b/c"), "/b/c");

        let nested = Base::new("/a/b");
        assert_eq!(nested.relative("/a"), "/a");
        assert_eq!(nested.relative("/a/b"), "/");
        assert_eq!(nested.relative("/a/b/c"), "/c");
    }

    #[test]
    fn test_relative_normalizes_location() {
        let app = Base::new("/app");
        assert_eq!(app.relative("//app/foo"), "/foo");
        assert_eq!(app.relative("/app//foo/"), "/foo");
        assert_eq!(app.relative("//app//"), "/");
        assert_eq!(app.relative("//other//x"), "/other/x");
        assert_eq!(Base::new("/").relative("//a//b/"), "/a/b");
    }

    #[test]
    fn test_absolute() {
        let empty = Base::new("/");
        assert_eq!(empty.absolute("/a"), "/a");
        assert_eq!(empty.absolute("/a/b/c"), "/a/b/c");

        let simple = Base::new("/a");
        assert_eq!(simple.absolute("/a"), "/a/a");
        assert_eq!(simple.absolute("a/b"), "/a/a/b");
        assert_eq!(simple.absolute("/"), "/a");

        let nested = Base::new("/a/b/");
        assert_eq!(nested.absolute("/a"), "/a/b/a");
        assert_eq!(nested.absolute("/a/b/c"), "/a/b/a/b/c");
    }
}
