//! Package name to definition directory index.
//!
//! Entries come from an explicit include path (`package:directory`), from
//! packages discovered while resolving dependencies, and from the implicit
//! strategy: probing a list of [`SearchRoot`]s the first time an unknown
//! package is asked for. Entries are never removed.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{ImportError, ImportResult};
use crate::schema::{SchemaKind, validate_package_name};

/// A directory tree probed by implicit resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchRoot {
    /// Source layout: `<root>/<package>/msg` (`ROS_PACKAGE_PATH` entries)
    Source(PathBuf),
    /// Install layout: `<prefix>/share/<package>/msg` (`AMENT_PREFIX_PATH`
    /// entries)
    Install(PathBuf),
}

impl SearchRoot {
    /// Message directory of `package` under this root, whether or not it exists
    #[must_use]
    pub fn message_dir(&self, package: &str) -> PathBuf {
        let msg = SchemaKind::Message.dir_name();
        match self {
            SearchRoot::Source(root) => root.join(package).join(msg),
            SearchRoot::Install(prefix) => prefix.join("share").join(package).join(msg),
        }
    }
}

/// Ordered, deduplicated message directories per package
#[derive(Debug, Clone, Default)]
pub struct SearchPathIndex {
    entries: IndexMap<String, IndexSet<PathBuf>>,
    roots: Vec<SearchRoot>,
}

impl SearchPathIndex {
    /// Create an empty index without implicit roots
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse include path entries of the form `package:directory`
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidIncludePath`] for an entry without a
    /// package or a directory, and [`ImportError::InvalidPackageName`] for an
    /// invalid package name.
    pub fn from_include_path<I, S>(entries: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let Some((package, dir)) = entry.split_once(':') else {
                return Err(ImportError::InvalidIncludePath {
                    entry: entry.to_string(),
                });
            };
            if package.is_empty() || dir.is_empty() {
                return Err(ImportError::InvalidIncludePath {
                    entry: entry.to_string(),
                });
            }
            validate_package_name(package)?;
            index.add(package, dir);
        }
        Ok(index)
    }

    /// Render the index back into include path entries
    #[must_use]
    pub fn to_include_path(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(package, dirs)| {
                dirs.iter()
                    .map(move |dir| format!("{package}:{}", dir.display()))
            })
            .collect()
    }

    /// Append a root probed by implicit resolution
    pub fn add_root(&mut self, root: SearchRoot) {
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    /// Roots probed by implicit resolution
    #[must_use]
    pub fn roots(&self) -> &[SearchRoot] {
        &self.roots
    }

    /// Record a directory for a package. Returns `false` if it was known.
    pub fn add(&mut self, package: &str, dir: impl Into<PathBuf>) -> bool {
        self.entries
            .entry(package.to_string())
            .or_default()
            .insert(dir.into())
    }

    /// Whether the package has at least one recorded directory
    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.entries.get(package).is_some_and(|dirs| !dirs.is_empty())
    }

    /// Recorded directories of a package, without implicit resolution
    #[must_use]
    pub fn get(&self, package: &str) -> Option<&IndexSet<PathBuf>> {
        self.entries.get(package).filter(|dirs| !dirs.is_empty())
    }

    /// Directories of a package, trying implicit resolution on a miss
    ///
    /// A successful implicit lookup is recorded. An empty result means the
    /// package is unknown; the caller decides whether that is fatal.
    pub fn resolve(&mut self, package: &str) -> Vec<PathBuf> {
        if let Some(dirs) = self.get(package) {
            return dirs.iter().cloned().collect();
        }
        let found: Vec<PathBuf> = self
            .roots
            .iter()
            .map(|root| root.message_dir(package))
            .filter(|dir| dir.is_dir())
            .collect();
        for dir in &found {
            debug!(package, dir = %dir.display(), "resolved package implicitly");
            self.add(package, dir.clone());
        }
        found
    }

    /// Path of `<Type>.msg` in the package's recorded directories
    #[must_use]
    pub fn find_type(&self, package: &str, type_name: &str) -> Option<PathBuf> {
        let file = format!("{type_name}.{}", SchemaKind::Message.extension());
        self.get(package)?
            .iter()
            .map(|dir| dir.join(&file))
            .find(|path| path.is_file())
    }

    /// Known packages, in insertion order
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<PathBuf>)> {
        self.entries
            .iter()
            .map(|(package, dirs)| (package.as_str(), dirs))
    }

    /// Whether `dir` is recorded for `package`
    #[must_use]
    pub fn has_dir(&self, package: &str, dir: &Path) -> bool {
        self.entries
            .get(package)
            .is_some_and(|dirs| dirs.contains(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_include_path_round_trip() {
        let index =
            SearchPathIndex::from_include_path(["std_msgs:/opt/ros/share/std_msgs/msg", "pkg:/a", "pkg:/b", "pkg:/a"])
                .unwrap();
        assert_eq!(index.get("pkg").unwrap().len(), 2);
        assert_eq!(
            index.to_include_path(),
            vec![
                "std_msgs:/opt/ros/share/std_msgs/msg".to_string(),
                "pkg:/a".to_string(),
                "pkg:/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_include_path_errors() {
        assert!(matches!(
            SearchPathIndex::from_include_path(["no_separator"]),
            Err(ImportError::InvalidIncludePath { .. })
        ));
        assert!(matches!(
            SearchPathIndex::from_include_path([":/dir"]),
            Err(ImportError::InvalidIncludePath { .. })
        ));
        assert!(matches!(
            SearchPathIndex::from_include_path(["bad-name:/dir"]),
            Err(ImportError::InvalidPackageName { .. })
        ));
    }

    #[test]
    fn test_implicit_resolution_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let prefix = temp_dir.path().join("install");
        fs::create_dir_all(src.join("pkgA/msg")).unwrap();
        fs::create_dir_all(prefix.join("share/pkgA/msg")).unwrap();

        let mut index = SearchPathIndex::new();
        index.add_root(SearchRoot::Source(src.clone()));
        index.add_root(SearchRoot::Install(prefix.clone()));
        assert!(!index.contains("pkgA"));

        let dirs = index.resolve("pkgA");
        assert_eq!(
            dirs,
            vec![src.join("pkgA/msg"), prefix.join("share/pkgA/msg")]
        );
        assert!(index.contains("pkgA"));
        assert!(index.resolve("missing").is_empty());
        assert!(!index.contains("missing"));
    }

    #[test]
    fn test_find_type() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("pkgA/msg");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("A.msg"), "bool v\n").unwrap();

        let mut index = SearchPathIndex::new();
        index.add("pkgA", &dir);
        assert_eq!(index.find_type("pkgA", "A"), Some(dir.join("A.msg")));
        assert_eq!(index.find_type("pkgA", "Missing"), None);
        assert_eq!(index.find_type("other", "A"), None);
    }
}
