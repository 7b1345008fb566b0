// ABOUTME: Immutable path identities built by composing validated components
// ABOUTME: Equality follows the resolved absolute location, relativization follows base markers

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::error::{PathError, Result};

/// Separator used for every relative path rendering, regardless of platform.
pub const SEPARATOR: char = '/';

/// A location in a directory tree.
///
/// Values are cheap to clone and never change after construction. Two values
/// compare equal when they resolve to the same absolute location, however they
/// were built.
#[derive(Clone)]
pub struct BuildPath {
    inner: Arc<PathNode>,
}

struct PathNode {
    kind: PathKind,
    absolute: PathBuf,
}

enum PathKind {
    Root,
    Child { parent: BuildPath, name: String },
    Base { marked: BuildPath },
}

impl BuildPath {
    fn from_kind(kind: PathKind, absolute: PathBuf) -> Self {
        Self {
            inner: Arc::new(PathNode { kind, absolute }),
        }
    }

    /// Anchor a path tree at an absolute location. `.` and `..` components
    /// are resolved lexically first.
    pub fn root(location: impl Into<PathBuf>) -> Result<Self> {
        let location = location.into();
        if !location.is_absolute() {
            return Err(PathError::NotAbsolute(location));
        }
        Ok(Self::from_kind(PathKind::Root, normalize(&location)))
    }

    /// Decompose an absolute filesystem path into its filesystem root and a
    /// chain of validated children.
    pub fn from_absolute(path: &Path) -> Result<Self> {
        if !path.is_absolute() {
            return Err(PathError::NotAbsolute(path.to_path_buf()));
        }

        let mut root_location = PathBuf::new();
        let mut names = Vec::new();

        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    root_location.push(component.as_os_str());
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(PathError::UnsupportedComponent {
                        path: path.to_path_buf(),
                        component: "..".to_string(),
                    });
                }
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| PathError::NonUtf8Name(path.to_path_buf()))?;
                    names.push(name);
                }
            }
        }

        names
            .into_iter()
            .try_fold(Self::root(root_location)?, |parent, name| parent.child(name))
    }

    /// Rebuild a path below `base` from a string using either `/` or `\` as
    /// separators. Empty and `.` segments are ignored.
    pub fn from_string(base: &BuildPath, value: &str) -> Result<Self> {
        value
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .try_fold(base.clone(), |parent, segment| parent.child(segment))
    }

    /// Compose a single child component onto this path.
    pub fn child(&self, component: &str) -> Result<Self> {
        validate_component(component)?;
        let absolute = self.inner.absolute.join(component);
        Ok(Self::from_kind(
            PathKind::Child {
                parent: self.clone(),
                name: component.to_string(),
            },
            absolute,
        ))
    }

    /// Mark this path as the anchor for relative path computation.
    ///
    /// Fails when this path or one of its ancestors is already marked.
    pub fn mark_base(&self) -> Result<Self> {
        if let Some(existing) = self.base_marker() {
            return Err(PathError::DuplicateBaseMarker {
                path: self.inner.absolute.clone(),
                existing: existing.inner.absolute.clone(),
            });
        }

        Ok(Self::from_kind(
            PathKind::Base {
                marked: self.clone(),
            },
            self.inner.absolute.clone(),
        ))
    }

    /// The nearest base marker in this path's chain, including itself.
    pub fn base_marker(&self) -> Option<&BuildPath> {
        match &self.inner.kind {
            PathKind::Root => None,
            PathKind::Base { .. } => Some(self),
            PathKind::Child { parent, .. } => parent.base_marker(),
        }
    }

    pub fn is_base_marker(&self) -> bool {
        matches!(self.inner.kind, PathKind::Base { .. })
    }

    pub fn is_root(&self) -> bool {
        matches!(self.inner.kind, PathKind::Root)
    }

    pub fn parent(&self) -> Option<&BuildPath> {
        match &self.inner.kind {
            PathKind::Root => None,
            PathKind::Child { parent, .. } => Some(parent),
            PathKind::Base { marked } => marked.parent(),
        }
    }

    /// Final component of the path. A root reports the last component of its
    /// location, if any.
    pub fn name(&self) -> Option<&str> {
        match &self.inner.kind {
            PathKind::Root => self.inner.absolute.file_name().and_then(|n| n.to_str()),
            PathKind::Child { name, .. } => Some(name),
            PathKind::Base { marked } => marked.name(),
        }
    }

    pub fn absolute(&self) -> &Path {
        &self.inner.absolute
    }

    /// The absolute location with symbolic links resolved when it exists.
    pub fn canonical(&self) -> PathBuf {
        std::fs::canonicalize(&self.inner.absolute).unwrap_or_else(|_| self.inner.absolute.clone())
    }

    /// Components from the nearest base marker (or the root) down to this
    /// path, joined with `/`. Empty at a root or a base marker.
    pub fn relative_path(&self) -> String {
        match &self.inner.kind {
            PathKind::Root | PathKind::Base { .. } => String::new(),
            PathKind::Child { parent, name } => {
                let prefix = parent.relative_path();
                if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}{}{}", prefix, SEPARATOR, name)
                }
            }
        }
    }

    /// Relative path used for archive entries and copies.
    ///
    /// With a base marker in the chain this is [`relative_path`]. Otherwise
    /// the canonical locations are compared and `None` is returned when this
    /// path is not below `base`.
    ///
    /// [`relative_path`]: BuildPath::relative_path
    pub fn relative_to(&self, base: &Path) -> Option<String> {
        if self.base_marker().is_some() {
            return Some(self.relative_path());
        }

        let base = std::fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        let candidate = self.canonical();
        let remainder = candidate.strip_prefix(&base).ok()?;

        let parts: Vec<String> = remainder
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join(&SEPARATOR.to_string()))
    }

    pub fn exists(&self) -> bool {
        self.inner.absolute.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.inner.absolute.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.inner.absolute.is_file()
    }
}

/// Resolve `.` and `..` components without touching the filesystem. `..` at
/// the filesystem root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn validate_component(component: &str) -> Result<()> {
    let reason = if component.is_empty() {
        "component is empty"
    } else if component.contains(['/', '\\']) {
        "component contains a path separator"
    } else if component == "." || component == ".." {
        "relative navigation is not permitted"
    } else {
        return Ok(());
    };

    Err(PathError::InvalidComponent {
        component: component.to_string(),
        reason: reason.to_string(),
    })
}

impl PartialEq for BuildPath {
    fn eq(&self, other: &Self) -> bool {
        self.inner.absolute == other.inner.absolute
    }
}

impl Eq for BuildPath {}

impl Hash for BuildPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.absolute.hash(state);
    }
}

impl PartialOrd for BuildPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BuildPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.absolute.cmp(&other.inner.absolute)
    }
}

impl fmt::Display for BuildPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.absolute.display())
    }
}

impl fmt::Debug for BuildPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner.kind {
            PathKind::Root => "root",
            PathKind::Child { .. } => "child",
            PathKind::Base { .. } => "base",
        };
        f.debug_struct("BuildPath")
            .field("kind", &kind)
            .field("absolute", &self.inner.absolute)
            .field("relative", &self.relative_path())
            .finish()
    }
}

impl Serialize for BuildPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner.absolute.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(path: &BuildPath) -> u64 {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        hasher.finish()
    }

    fn project() -> BuildPath {
        let location = std::env::temp_dir().join("keystone-identity");
        BuildPath::root(location).unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/.")), PathBuf::from("/a/b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_root_resolves_navigation_components() {
        let base = std::env::temp_dir().join("keystone-identity");
        let detour = BuildPath::root(base.join("x").join("..").join("y").join("."))
            .unwrap()
            .child("f")
            .unwrap();
        let direct = BuildPath::root(base.join("y")).unwrap().child("f").unwrap();

        assert_eq!(detour, direct);
        assert_eq!(hash_of(&detour), hash_of(&direct));
        assert_eq!(detour.absolute(), base.join("y").join("f"));
    }

    #[test]
    fn test_root_requires_absolute_location() {
        assert!(matches!(
            BuildPath::root("relative/dir"),
            Err(PathError::NotAbsolute(_))
        ));
    }

    #[test]
    fn test_invalid_components_are_rejected() {
        let root = project();
        for bad in ["", "a/b", "a\\b", ".", ".."] {
            let result = root.child(bad);
            assert!(
                matches!(result, Err(PathError::InvalidComponent { .. })),
                "component {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_child_relative_path() {
        let root = project();
        let src = root.child("src").unwrap();
        assert_eq!(src.relative_path(), "src");

        let main = src.child("valid-name").unwrap();
        assert_eq!(main.relative_path(), "src/valid-name");
        assert_eq!(main.name(), Some("valid-name"));
        assert_eq!(main.parent(), Some(&src));
    }

    #[test]
    fn test_equality_by_resolved_location() {
        let root = project();
        let direct = root.child("a").unwrap().child("b").unwrap();
        let via_base = root
            .child("a")
            .unwrap()
            .mark_base()
            .unwrap()
            .child("b")
            .unwrap();
        let via_string = BuildPath::from_string(&root, "a\\b/").unwrap();

        assert_eq!(direct, via_base);
        assert_eq!(direct, via_string);
        assert_eq!(hash_of(&direct), hash_of(&via_base));
        assert_eq!(hash_of(&direct), hash_of(&via_string));

        // Same location, different relative views
        assert_eq!(direct.relative_path(), "a/b");
        assert_eq!(via_base.relative_path(), "b");
    }

    #[test]
    fn test_base_marker_resets_relative_path() {
        let root = project();
        let lib = root.child("lib").unwrap().mark_base().unwrap();

        assert!(lib.is_base_marker());
        assert_eq!(lib.relative_path(), "");
        assert_eq!(lib.name(), Some("lib"));

        let nested = lib.child("x").unwrap().child("y.jar").unwrap();
        assert_eq!(nested.relative_path(), "x/y.jar");
        assert_eq!(nested.base_marker(), Some(&lib));
    }

    #[test]
    fn test_second_base_marker_in_chain_fails() {
        let root = project();
        let marked = root.child("lib").unwrap().mark_base().unwrap();

        assert!(matches!(
            marked.mark_base(),
            Err(PathError::DuplicateBaseMarker { .. })
        ));
        assert!(matches!(
            marked.child("deeper").unwrap().mark_base(),
            Err(PathError::DuplicateBaseMarker { .. })
        ));
    }

    #[test]
    fn test_from_absolute_decomposes_into_root_and_children() {
        let location = std::env::temp_dir().join("keystone-decompose").join("inner");
        let path = BuildPath::from_absolute(&location).unwrap();

        assert_eq!(path.absolute(), location.as_path());
        assert_eq!(path.name(), Some("inner"));

        let mut cursor = &path;
        while let Some(parent) = cursor.parent() {
            cursor = parent;
        }
        assert!(cursor.is_root());
    }

    #[test]
    fn test_from_absolute_rejects_parent_navigation() {
        let location = std::env::temp_dir().join("a").join("..").join("b");
        assert!(matches!(
            BuildPath::from_absolute(&location),
            Err(PathError::UnsupportedComponent { .. })
        ));
    }

    #[test]
    fn test_relative_to_without_base_marker() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("pkg").join("sub")).unwrap();
        std::fs::write(temp.path().join("pkg").join("sub").join("file.txt"), "x").unwrap();

        let root = BuildPath::root(temp.path()).unwrap();
        let file = BuildPath::from_string(&root, "pkg/sub/file.txt").unwrap();

        assert_eq!(
            file.relative_to(&temp.path().join("pkg")),
            Some("sub/file.txt".to_string())
        );
        assert_eq!(file.relative_to(&temp.path().join("other")), None);
    }

    #[test]
    fn test_relative_to_prefers_base_marker() {
        let root = project();
        let file = root
            .child("classes")
            .unwrap()
            .mark_base()
            .unwrap()
            .child("A.class")
            .unwrap();

        assert_eq!(
            file.relative_to(Path::new("/somewhere/else")),
            Some("A.class".to_string())
        );
    }
}
