//! At-most-once bookkeeping for generated packages.

use indexmap::IndexSet;

/// Packages generated in this session, plus the ones being generated
///
/// A package is committed only after its entry point exists; a failed
/// attempt is aborted and leaves no trace, so a later request retries it.
#[derive(Debug, Clone, Default)]
pub struct GenerationCache {
    committed: IndexSet<String>,
    in_progress: IndexSet<String>,
}

impl GenerationCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time it is called for a package, `false` afterwards
    pub fn once(&mut self, package: &str) -> bool {
        if self.in_progress.contains(package) {
            return false;
        }
        self.committed.insert(package.to_string())
    }

    /// Whether the package has been committed
    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.committed.contains(package)
    }

    /// Whether the package is being generated right now
    #[must_use]
    pub fn is_in_progress(&self, package: &str) -> bool {
        self.in_progress.contains(package)
    }

    /// Mark a package as being generated. Returns `false` if it is already
    /// committed or in progress.
    pub fn begin(&mut self, package: &str) -> bool {
        if self.committed.contains(package) {
            return false;
        }
        self.in_progress.insert(package.to_string())
    }

    /// Record a successful generation
    pub fn commit(&mut self, package: &str) {
        self.in_progress.shift_remove(package);
        self.committed.insert(package.to_string());
    }

    /// Forget a failed generation
    pub fn abort(&mut self, package: &str) {
        self.in_progress.shift_remove(package);
    }

    /// Packages in progress, outermost first
    pub fn in_progress(&self) -> impl Iterator<Item = &str> {
        self.in_progress.iter().map(String::as_str)
    }

    /// Committed packages, in commit order
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.committed.iter().map(String::as_str)
    }

    /// Number of committed packages
    #[must_use]
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Whether nothing has been committed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once() {
        let mut cache = GenerationCache::new();
        assert!(cache.once("pkgA"));
        assert!(!cache.once("pkgA"));
        assert!(cache.once("pkgB"));
        assert_eq!(cache.packages().collect::<Vec<_>>(), vec!["pkgA", "pkgB"]);
    }

    #[test]
    fn test_abort_leaves_no_trace() {
        let mut cache = GenerationCache::new();
        assert!(cache.begin("pkg"));
        assert!(!cache.begin("pkg"));
        assert!(cache.is_in_progress("pkg"));
        assert!(!cache.once("pkg"));
        cache.abort("pkg");
        assert!(!cache.contains("pkg"));
        assert!(cache.is_empty());
        assert!(cache.begin("pkg"));
        cache.commit("pkg");
        assert!(cache.contains("pkg"));
        assert!(!cache.begin("pkg"));
        assert!(!cache.once("pkg"));
    }
}
