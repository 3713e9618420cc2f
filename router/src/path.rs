//! Path normalization and tokenizing.
//!
//! A normalized path always has a single leading `/`, no trailing `/` and no
//! empty segments. The root path normalizes to `/`.

use std::fmt;

/// Split a raw path into its non-empty segments.
///
/// ```
/// use waymark_router::path::split;
///
/// assert_eq!(split("/users//123/"), vec!["users", "123"]);
/// assert!(split("/").is_empty());
/// ```
pub fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Normalize a raw path: leading `/`, no trailing `/`, repeated separators collapsed.
pub fn normalize(path: &str) -> String {
    join(split(path))
}

/// Build a normalized path from segments.
pub(crate) fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut normalized = String::new();
    for segment in segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// An immutable, normalized path value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new(raw: &str) -> Self {
        Self {
            segments: split(raw).into_iter().map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.is_empty()
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Path::new(raw)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(self.segments.iter().map(String::as_str)))
    }
}
