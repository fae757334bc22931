//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to forward slashes.
///
/// Config files are indexed and compared by this form, so ordering is the
/// lexicographic order of the normalized string on every platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes, repeated separators collapse and
    /// `.` segments are dropped. `..` is resolved lexically; it is kept only
    /// at the start of a relative path and dropped at an absolute root.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    _ if absolute => {}
                    _ => segments.push(".."),
                },
                other => segments.push(other),
            }
        }

        let mut inner = segments.join("/");
        if absolute {
            inner.insert(0, '/');
        }
        if inner.is_empty() {
            inner.push('.');
        }
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a relative segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner == "." {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self::new("/")),
            Some(0) => None,
            Some(idx) => Some(Self::new(&self.inner[..idx])),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != ".")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Whether the file name equals `basename`, ignoring ASCII case.
    pub fn has_file_name(&self, basename: &str) -> bool {
        self.file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(basename))
    }

    /// Path of `self` relative to `root`, if `self` lies under it.
    pub fn relative_to(&self, root: &NormalizedPath) -> Option<String> {
        if root.inner == "." {
            let escapes = self.inner.starts_with('/') || self.inner.split('/').any(|s| s == "..");
            return (!escapes).then(|| self.inner.clone());
        }
        let rest = self.inner.strip_prefix(root.inner.as_str())?;
        if rest.is_empty() {
            return Some(String::new());
        }
        if root.inner.ends_with('/') {
            return Some(rest.to_string());
        }
        rest.strip_prefix('/').map(str::to_string)
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_dot_segments() {
        let path = NormalizedPath::new("Assets//./Firebase\\google-services.json");
        assert_eq!(path.as_str(), "Assets/Firebase/google-services.json");
    }

    #[test]
    fn parent_segments_resolve_lexically() {
        assert_eq!(NormalizedPath::new("/p/Build/ios/../../Assets/a").as_str(), "/p/Assets/a");
        assert_eq!(NormalizedPath::new("/../a").as_str(), "/a");
        assert_eq!(NormalizedPath::new("../../a/b/..").as_str(), "../../a");
        assert_eq!(NormalizedPath::new("a/..").as_str(), ".");
    }

    #[test]
    fn relative_to_rejects_escaping_paths() {
        let project = NormalizedPath::new("/p/Build/ios");
        let escaped = NormalizedPath::new("/p/Build/ios/../../Assets/a.plist");
        assert_eq!(escaped.relative_to(&project), None);

        let here = NormalizedPath::new(".");
        assert_eq!(NormalizedPath::new("../a").relative_to(&here), None);
        assert_eq!(NormalizedPath::new("a/b").relative_to(&here).as_deref(), Some("a/b"));
    }

    #[test]
    fn parent_of_root_child_is_root() {
        let path = NormalizedPath::new("/Assets");
        assert_eq!(path.parent().unwrap().as_str(), "/");
        assert!(NormalizedPath::new("/").parent().is_none());
    }

    #[test]
    fn relative_to_requires_segment_boundary() {
        let root = NormalizedPath::new("/project/Assets");
        let inside = NormalizedPath::new("/project/Assets/a/b.json");
        let sibling = NormalizedPath::new("/project/AssetsOther/b.json");

        assert_eq!(inside.relative_to(&root).as_deref(), Some("a/b.json"));
        assert_eq!(sibling.relative_to(&root), None);
    }
}
