// ABOUTME: Lazy file-set expressions over path identities (union, exclusion, child and descendant match)
// ABOUTME: Evaluation re-queries the filesystem every time and returns a deduplicated set

use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Sub};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

use super::error::{PathError, Result};
use super::filter::NameFilter;
use super::identity::BuildPath;
use crate::outcome::{self, Outcome};

type Source = Arc<dyn Fn() -> Result<Vec<BuildPath>> + Send + Sync>;

/// An immutable query over a directory tree.
///
/// Building an expression never touches the filesystem; [`FileSet::evaluate`]
/// does, on every call.
#[derive(Clone)]
pub struct FileSet {
    expr: Arc<Expr>,
}

enum Expr {
    Empty,
    Fixed(Source),
    Union(FileSet, FileSet),
    Exclude(FileSet, FileSet),
    Children(FileSet, NameFilter),
    Descendants(FileSet, NameFilter),
}

impl FileSet {
    fn from_expr(expr: Expr) -> Self {
        Self {
            expr: Arc::new(expr),
        }
    }

    pub fn empty() -> Self {
        Self::from_expr(Expr::Empty)
    }

    /// A fixed set of paths.
    pub fn of(paths: impl IntoIterator<Item = BuildPath>) -> Self {
        let paths: Vec<BuildPath> = paths.into_iter().collect();
        Self::from_fn(move || Ok(paths.clone()))
    }

    /// Paths produced by `source` each time the expression is evaluated.
    pub fn from_fn<F>(source: F) -> Self
    where
        F: Fn() -> Result<Vec<BuildPath>> + Send + Sync + 'static,
    {
        Self::from_expr(Expr::Fixed(Arc::new(source)))
    }

    pub fn union(&self, other: &FileSet) -> Self {
        Self::from_expr(Expr::Union(self.clone(), other.clone()))
    }

    pub fn exclude(&self, other: &FileSet) -> Self {
        Self::from_expr(Expr::Exclude(self.clone(), other.clone()))
    }

    /// Immediate children of every path in this set whose name matches.
    pub fn children(&self, filter: impl Into<NameFilter>) -> Self {
        Self::from_expr(Expr::Children(self.clone(), filter.into()))
    }

    /// Every path in this set, and every path below it, whose name matches.
    /// Directories are descended into whether or not they match.
    pub fn descendants(&self, filter: impl Into<NameFilter>) -> Self {
        Self::from_expr(Expr::Descendants(self.clone(), filter.into()))
    }

    /// Matching descendants, minus everything matching `include` found below
    /// a directory matching `intermediate_exclude`.
    pub fn descendants_except(
        &self,
        include: impl Into<NameFilter>,
        intermediate_exclude: impl Into<NameFilter>,
    ) -> Self {
        let include = include.into();
        let excluded_dirs = self.descendants(intermediate_exclude);
        self.descendants(include.clone())
            .exclude(&excluded_dirs.descendants(include))
    }

    pub fn evaluate(&self) -> Result<HashSet<BuildPath>> {
        match self.expr.as_ref() {
            Expr::Empty => Ok(HashSet::new()),
            Expr::Fixed(source) => Ok(source()?.into_iter().collect()),
            Expr::Union(left, right) => {
                let mut found = left.evaluate()?;
                found.extend(right.evaluate()?);
                Ok(found)
            }
            Expr::Exclude(left, right) => {
                let mut found = left.evaluate()?;
                let removed = right.evaluate()?;
                found.retain(|path| !removed.contains(path));
                Ok(found)
            }
            Expr::Children(source, filter) => {
                let mut found = HashSet::new();
                for path in source.evaluate()? {
                    collect_children(&path, filter, &mut found)?;
                }
                Ok(found)
            }
            Expr::Descendants(source, filter) => {
                let mut found = HashSet::new();
                for path in source.evaluate()? {
                    collect_descendants(&path, filter, &mut found)?;
                }
                Ok(found)
            }
        }
    }

    /// [`evaluate`](FileSet::evaluate) ordered by absolute location.
    pub fn evaluate_sorted(&self) -> Result<Vec<BuildPath>> {
        let mut paths: Vec<BuildPath> = self.evaluate()?.into_iter().collect();
        paths.sort();
        Ok(paths)
    }
}

fn collect_children(
    parent: &BuildPath,
    filter: &NameFilter,
    found: &mut HashSet<BuildPath>,
) -> Result<()> {
    if !parent.is_dir() {
        return Ok(());
    }

    let entries = std::fs::read_dir(parent.absolute()).map_err(|source| PathError::ReadDir {
        path: parent.absolute().to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| PathError::ReadDir {
            path: parent.absolute().to_path_buf(),
            source,
        })?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| PathError::NonUtf8Name(entry.path()))?;

        if filter.matches(&name) {
            found.insert(parent.child(&name)?);
        }
    }

    Ok(())
}

fn collect_descendants(
    start: &BuildPath,
    filter: &NameFilter,
    found: &mut HashSet<BuildPath>,
) -> Result<()> {
    if !start.exists() {
        debug!("Skipping missing file-set root {}", start);
        return Ok(());
    }

    if start.name().is_some_and(|name| filter.matches(name)) {
        found.insert(start.clone());
    }

    if !start.is_dir() {
        return Ok(());
    }

    let mut walking = vec![canonical(start.absolute())?];
    walk_below(start, filter, found, &mut walking)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|source| PathError::ReadDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Every matching entry below `dir`. Links are never followed by the walk
/// itself; a link to a directory is descended into as a directory of its own,
/// and a dangling link is an ordinary entry. `walking` holds the real
/// locations of the directories currently being walked; a link resolving to
/// one of them or to an ancestor of one is a cycle.
fn walk_below(
    dir: &BuildPath,
    filter: &NameFilter,
    found: &mut HashSet<BuildPath>,
    walking: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in WalkDir::new(dir.absolute()).min_depth(1).follow_links(false) {
        let entry = entry?;
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| PathError::NonUtf8Name(entry.path().to_path_buf()))?;
        let matched = filter.matches(name);
        let linked_dir = entry.path_is_symlink() && entry.path().is_dir();
        if !matched && !linked_dir {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir.absolute())
            .map_err(|_| PathError::NotDescendant {
                path: entry.path().to_path_buf(),
                base: dir.absolute().to_path_buf(),
            })?;

        // Rebuild through `child` so base markers in `dir` carry over.
        let path = relative.components().try_fold(dir.clone(), |parent, component| {
            let component = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| PathError::NonUtf8Name(entry.path().to_path_buf()))?;
            parent.child(component)
        })?;

        if linked_dir {
            let target = canonical(entry.path())?;
            if walking.iter().any(|active| active.starts_with(&target)) {
                return Err(PathError::LinkCycle {
                    link: entry.path().to_path_buf(),
                    target,
                });
            }
            walking.push(target);
            walk_below(&path, filter, found, walking)?;
            walking.pop();
        }
        if matched {
            found.insert(path);
        }
    }

    Ok(())
}

/// Evaluate a file set through the outcome substrate.
pub fn run_file_set(set: &FileSet) -> Outcome<HashSet<BuildPath>> {
    outcome::attempt("evaluating file set", || set.evaluate())
}

impl From<BuildPath> for FileSet {
    fn from(path: BuildPath) -> Self {
        FileSet::of([path])
    }
}

impl Add for FileSet {
    type Output = FileSet;

    fn add(self, other: FileSet) -> FileSet {
        self.union(&other)
    }
}

impl<'a> Add<&'a FileSet> for &'a FileSet {
    type Output = FileSet;

    fn add(self, other: &'a FileSet) -> FileSet {
        self.union(other)
    }
}

impl Sub for FileSet {
    type Output = FileSet;

    fn sub(self, other: FileSet) -> FileSet {
        self.exclude(&other)
    }
}

impl<'a> Sub<&'a FileSet> for &'a FileSet {
    type Output = FileSet;

    fn sub(self, other: &'a FileSet) -> FileSet {
        self.exclude(other)
    }
}

impl fmt::Debug for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr.as_ref() {
            Expr::Empty => write!(f, "empty"),
            Expr::Fixed(_) => write!(f, "fixed(..)"),
            Expr::Union(left, right) => write!(f, "({:?} + {:?})", left, right),
            Expr::Exclude(left, right) => write!(f, "({:?} - {:?})", left, right),
            Expr::Children(source, filter) => write!(f, "({:?} * {:?})", source, filter),
            Expr::Descendants(source, filter) => write!(f, "({:?} ** {:?})", source, filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// root/{a.txt, sub/{b.txt, c.log}, build/{gen.txt, deep/{d.txt}}}
    fn sample_tree() -> (TempDir, BuildPath) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub").join("b.txt"), "b").unwrap();
        fs::write(dir.join("sub").join("c.log"), "c").unwrap();
        fs::create_dir_all(dir.join("build").join("deep")).unwrap();
        fs::write(dir.join("build").join("gen.txt"), "g").unwrap();
        fs::write(dir.join("build").join("deep").join("d.txt"), "d").unwrap();

        let root = BuildPath::root(dir).unwrap();
        (temp, root)
    }

    fn paths(root: &BuildPath, relative: &[&str]) -> HashSet<BuildPath> {
        relative
            .iter()
            .map(|r| BuildPath::from_string(root, r).unwrap())
            .collect()
    }

    #[test]
    fn test_descendants_match_at_any_depth() {
        let (_temp, root) = sample_tree();
        let base = FileSet::from(root.clone());

        assert_eq!(
            base.descendants("*.log").evaluate().unwrap(),
            paths(&root, &["sub/c.log"])
        );
        assert_eq!(
            base.descendants("*.txt").evaluate().unwrap(),
            paths(
                &root,
                &["a.txt", "sub/b.txt", "build/gen.txt", "build/deep/d.txt"]
            )
        );
    }

    #[test]
    fn test_descendants_include_matching_start() {
        let (_temp, root) = sample_tree();
        let sub = root.child("sub").unwrap();

        let found = FileSet::from(sub.clone()).descendants("s*").evaluate().unwrap();
        assert_eq!(found, HashSet::from([sub]));
    }

    #[test]
    fn test_children_only_look_one_level_down() {
        let (_temp, root) = sample_tree();

        let found = FileSet::from(root.clone()).children("*.txt").evaluate().unwrap();
        assert_eq!(found, paths(&root, &["a.txt"]));

        let dirs = FileSet::from(root.clone()).children("*").evaluate().unwrap();
        assert_eq!(dirs, paths(&root, &["a.txt", "sub", "build"]));
    }

    #[test]
    fn test_union_and_exclusion_laws() {
        let (_temp, root) = sample_tree();
        let base = FileSet::from(root.clone());
        let x = base.descendants("*.txt");
        let y = base.descendants("b*") + base.descendants("*.log");

        let xs = x.evaluate().unwrap();
        let ys = y.evaluate().unwrap();

        let union = (&x + &y).evaluate().unwrap();
        assert_eq!(union, xs.union(&ys).cloned().collect());

        let difference = (&x - &y).evaluate().unwrap();
        assert_eq!(difference, xs.difference(&ys).cloned().collect());

        let twice = (&(&x - &y) - &y).evaluate().unwrap();
        assert_eq!(twice, difference);
    }

    #[test]
    fn test_descendants_except_skips_below_excluded_dirs() {
        let (_temp, root) = sample_tree();

        let found = FileSet::from(root.clone())
            .descendants_except("*.txt", "build")
            .evaluate()
            .unwrap();

        assert_eq!(found, paths(&root, &["a.txt", "sub/b.txt"]));
    }

    #[test]
    fn test_results_keep_base_marker_relativization() {
        let (_temp, root) = sample_tree();
        let marked = root.child("build").unwrap().mark_base().unwrap();

        let mut relative: Vec<String> = FileSet::from(marked)
            .descendants("*.txt")
            .evaluate()
            .unwrap()
            .iter()
            .map(|p| p.relative_path())
            .collect();
        relative.sort();

        assert_eq!(relative, vec!["deep/d.txt", "gen.txt"]);
    }

    #[test]
    fn test_fixed_source_is_requeried_on_every_evaluation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let set = FileSet::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });

        set.evaluate().unwrap();
        set.evaluate().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_new_files_are_seen_by_later_evaluations() {
        let (temp, root) = sample_tree();
        let logs = FileSet::from(root.clone()).descendants("*.log");
        assert_eq!(logs.evaluate().unwrap().len(), 1);

        fs::write(temp.path().join("late.log"), "late").unwrap();
        assert_eq!(logs.evaluate().unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_an_ordinary_entry() {
        let (temp, root) = sample_tree();
        std::os::unix::fs::symlink(temp.path().join("missing"), temp.path().join("link.txt"))
            .unwrap();
        let base = FileSet::from(root.clone());

        let children = base.children("*.txt").evaluate().unwrap();
        let descendants = base.descendants("*.txt").evaluate().unwrap();

        let link = root.child("link.txt").unwrap();
        assert!(children.contains(&link));
        assert!(descendants.contains(&link));
        assert_eq!(descendants.len(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directory_is_descended_into() {
        let (temp, root) = sample_tree();
        std::os::unix::fs::symlink(temp.path().join("sub"), temp.path().join("alias")).unwrap();

        let found = FileSet::from(root.clone()).descendants("*.log").evaluate().unwrap();

        assert_eq!(found, paths(&root, &["sub/c.log", "alias/c.log"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_link_back_to_an_ancestor_is_an_error() {
        let (temp, root) = sample_tree();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("sub").join("up")).unwrap();

        let err = FileSet::from(root).descendants("*.log").evaluate().unwrap_err();

        assert!(matches!(err, PathError::LinkCycle { .. }));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let (_temp, root) = sample_tree();
        let missing = root.child("does-not-exist").unwrap();

        let found = FileSet::from(missing.clone()).descendants("*").evaluate().unwrap();
        assert!(found.is_empty());
        assert!(FileSet::from(missing).children("*").evaluate().unwrap().is_empty());
    }

    #[test]
    fn test_run_file_set_traps_source_errors() {
        let failing = FileSet::from_fn(|| Err(PathError::Source("classpath unavailable".into())));

        let failure = run_file_set(&failing).unwrap_err();
        assert!(failure.message().starts_with("evaluating file set: "));
        assert!(failure.message().contains("classpath unavailable"));
    }

    #[test]
    fn test_evaluate_sorted_is_deterministic() {
        let (_temp, root) = sample_tree();
        let sorted = FileSet::from(root.clone())
            .descendants("*.txt")
            .evaluate_sorted()
            .unwrap();

        let mut expected = sorted.clone();
        expected.sort_by(|a, b| a.absolute().cmp(b.absolute()));
        assert_eq!(sorted, expected);
        assert_eq!(sorted.len(), 4);
    }
}
