//! Configuration of a generation session.
//!
//! This module provides the [`Config`] struct and [`ConfigBuilder`] for
//! configuring where packages are generated and how their dependencies are
//! found.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::PollPolicy;
use crate::resolver::WalkBounds;
use crate::search_path::SearchRoot;

/// Source-layout roots, each holding `<package>/msg`
pub const ROS_PACKAGE_PATH: &str = "ROS_PACKAGE_PATH";
/// Install prefixes, each holding `share/<package>/msg`
pub const AMENT_PREFIX_PATH: &str = "AMENT_PREFIX_PATH";

/// Configuration of a [`crate::GenerationContext`]
///
/// # Example
///
/// ```rust
/// use rosimport::Config;
///
/// let config = Config::builder()
///     .output_root("/tmp/generated")
///     .include_path("std_msgs:/opt/ros/noetic/share/std_msgs/msg")
///     .extra_search_path("/opt/custom/share")
///     .use_environment(false)
///     .build();
/// assert_eq!(config.boundary_marker(), "package.xml");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving generated packages.
    pub(crate) output_root: PathBuf,
    /// Explicit `package:directory` entries.
    pub(crate) include_path: Vec<String>,
    /// Additional source-layout roots for implicit resolution.
    pub(crate) extra_search_paths: Vec<PathBuf>,
    /// Whether implicit resolution also reads the environment.
    pub(crate) use_environment: bool,
    /// File marking the top of a package.
    pub(crate) boundary_marker: String,
    /// Maximum number of levels of the upward walk.
    pub(crate) max_walk_depth: usize,
    /// Sleep between two visibility checks.
    pub(crate) poll_interval: Duration,
    /// Number of visibility checks before giving up.
    pub(crate) poll_attempts: u32,
    /// Comment prepended to every generated file.
    pub(crate) header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let walk = WalkBounds::default();
        let poll = PollPolicy::default();
        Self {
            output_root: Self::default_output_root(),
            include_path: Vec::new(),
            extra_search_paths: Vec::new(),
            use_environment: true,
            boundary_marker: walk.boundary_marker,
            max_walk_depth: walk.max_depth,
            poll_interval: poll.interval,
            poll_attempts: poll.attempts,
            header: Some("// Auto-generated by rosimport. Do not edit.".to_string()),
        }
    }
}

impl Config {
    /// Creates a new [`ConfigBuilder`] for constructing a [`Config`].
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Process-scoped output directory: `<tmp>/rosimport/<pid>`
    #[must_use]
    pub fn default_output_root() -> PathBuf {
        env::temp_dir()
            .join("rosimport")
            .join(std::process::id().to_string())
    }

    /// Returns the output root.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Returns the explicit include path entries.
    #[must_use]
    pub fn include_path(&self) -> &[String] {
        &self.include_path
    }

    /// Returns the extra search paths.
    #[must_use]
    pub fn extra_search_paths(&self) -> &[PathBuf] {
        &self.extra_search_paths
    }

    /// Returns whether the environment is consulted.
    #[must_use]
    pub fn use_environment(&self) -> bool {
        self.use_environment
    }

    /// Returns the package boundary marker.
    #[must_use]
    pub fn boundary_marker(&self) -> &str {
        &self.boundary_marker
    }

    /// Returns the maximum walk depth.
    #[must_use]
    pub fn max_walk_depth(&self) -> usize {
        self.max_walk_depth
    }

    /// Returns the header comment.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Returns the walk bounds.
    #[must_use]
    pub fn walk_bounds(&self) -> WalkBounds {
        WalkBounds {
            boundary_marker: self.boundary_marker.clone(),
            max_depth: self.max_walk_depth,
        }
    }

    /// Returns the visibility poll policy.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            attempts: self.poll_attempts,
        }
    }

    /// Returns the roots probed by implicit resolution.
    ///
    /// Extra search paths come first, then `ROS_PACKAGE_PATH`, then
    /// `AMENT_PREFIX_PATH` when the environment is used. Roots that do not
    /// exist are skipped.
    #[must_use]
    pub fn search_roots(&self) -> Vec<SearchRoot> {
        let mut roots: Vec<SearchRoot> = self
            .extra_search_paths
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .map(SearchRoot::Source)
            .collect();

        if self.use_environment {
            roots.extend(Self::env_paths(ROS_PACKAGE_PATH).map(SearchRoot::Source));
            roots.extend(Self::env_paths(AMENT_PREFIX_PATH).map(SearchRoot::Install));
        }

        let mut unique = Vec::with_capacity(roots.len());
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        unique
    }

    /// Existing paths listed in an environment variable.
    fn env_paths(var: &str) -> impl Iterator<Item = PathBuf> {
        env::var_os(var)
            .map(|value| env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.as_os_str().is_empty() && p.exists())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the output root.
    #[must_use]
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    /// Adds one `package:directory` include path entry.
    #[must_use]
    pub fn include_path(mut self, entry: impl Into<String>) -> Self {
        self.config.include_path.push(entry.into());
        self
    }

    /// Adds several include path entries.
    #[must_use]
    pub fn include_paths<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .include_path
            .extend(entries.into_iter().map(Into::into));
        self
    }

    /// Adds a source-layout root for implicit resolution.
    #[must_use]
    pub fn extra_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.extra_search_paths.push(path.into());
        self
    }

    /// Sets whether `ROS_PACKAGE_PATH` and `AMENT_PREFIX_PATH` are read.
    #[must_use]
    pub fn use_environment(mut self, enabled: bool) -> Self {
        self.config.use_environment = enabled;
        self
    }

    /// Sets the package boundary marker.
    #[must_use]
    pub fn boundary_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.boundary_marker = marker.into();
        self
    }

    /// Sets the maximum walk depth.
    #[must_use]
    pub fn max_walk_depth(mut self, depth: usize) -> Self {
        self.config.max_walk_depth = depth;
        self
    }

    /// Sets the visibility poll interval and attempts.
    #[must_use]
    pub fn poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.config.poll_interval = interval;
        self.config.poll_attempts = attempts;
        self
    }

    /// Sets the header comment; `None` disables it.
    #[must_use]
    pub fn header(mut self, header: Option<impl Into<String>>) -> Self {
        self.config.header = header.map(Into::into);
        self
    }

    /// Builds the [`Config`].
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(
            config
                .output_root()
                .ends_with(format!("rosimport/{}", std::process::id()))
        );
        assert!(config.use_environment());
        assert_eq!(config.boundary_marker(), "package.xml");
        assert_eq!(config.max_walk_depth(), 16);
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .output_root("/out")
            .include_path("a:/x")
            .include_paths(["b:/y"])
            .boundary_marker("CMakeLists.txt")
            .max_walk_depth(3)
            .poll(Duration::from_millis(5), 2)
            .header(None::<String>)
            .build();
        assert_eq!(config.output_root(), Path::new("/out"));
        assert_eq!(config.include_path(), &["a:/x".to_string(), "b:/y".to_string()]);
        assert_eq!(config.walk_bounds().max_depth, 3);
        assert_eq!(config.walk_bounds().boundary_marker, "CMakeLists.txt");
        assert_eq!(config.poll_policy().attempts, 2);
        assert_eq!(config.header(), None);
    }

    #[test]
    fn test_search_roots_without_environment() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::builder()
            .extra_search_path(temp_dir.path())
            .extra_search_path(temp_dir.path())
            .extra_search_path(temp_dir.path().join("missing"))
            .use_environment(false)
            .build();
        assert_eq!(
            config.search_roots(),
            vec![SearchRoot::Source(temp_dir.path().to_path_buf())]
        );
    }
}
