//! Cross-package dependency resolution.
//!
//! For every package a definition references, the resolver finds the
//! directory holding that package's messages and plans its generation ahead
//! of the referencing package. Lookup order per package:
//!
//! 1. the [`SearchPathIndex`] (include path and earlier discoveries),
//! 2. an upward walk from the referencing file, bounded by the package
//!    boundary marker and a maximum depth,
//! 3. implicit resolution through the index's search roots.
//!
//! A package found by none of them is a [`ImportError::MissingDependency`].

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::backend::SchemaBackend;
use crate::cache::GenerationCache;
use crate::error::{ImportError, ImportResult};
use crate::schema::{SchemaFile, SchemaKind, list_kind_dir};
use crate::search_path::SearchPathIndex;

/// A package that must be generated before the one requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    /// Package name
    pub package: String,
    /// Its message definitions; services are never a dependency
    pub files: Vec<SchemaFile>,
}

/// Bounds of the upward filesystem walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkBounds {
    /// File marking the top of a package (`package.xml`)
    pub boundary_marker: String,
    /// Maximum number of parent directories visited
    pub max_depth: usize,
}

impl Default for WalkBounds {
    fn default() -> Self {
        Self {
            boundary_marker: "package.xml".to_string(),
            max_depth: 16,
        }
    }
}

/// Plans prerequisite packages in dependency order
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    bounds: WalkBounds,
}

/// State of one `gather_prerequisites` call
struct Plan<'a> {
    backend: &'a dyn SchemaBackend,
    search_path: &'a mut SearchPathIndex,
    cache: &'a GenerationCache,
    visiting: IndexSet<String>,
    planned: IndexMap<String, Prerequisite>,
}

impl DependencyResolver {
    /// Create a resolver with the given walk bounds
    #[must_use]
    pub fn new(bounds: WalkBounds) -> Self {
        Self { bounds }
    }

    /// Walk bounds in use
    #[must_use]
    pub fn bounds(&self) -> &WalkBounds {
        &self.bounds
    }

    /// Every package `files` depend on, transitively, that the cache has not
    /// seen yet, each one listed after its own prerequisites
    ///
    /// Directories found by walking or implicit resolution are recorded in
    /// `search_path`.
    ///
    /// # Errors
    ///
    /// - [`ImportError::MissingDependency`] if a referenced package cannot be
    ///   located
    /// - [`ImportError::DependencyCycle`] if packages reference each other in
    ///   a loop
    /// - [`ImportError::InvalidSchemaSpec`] if a definition is malformed
    pub fn gather_prerequisites(
        &self,
        backend: &dyn SchemaBackend,
        search_path: &mut SearchPathIndex,
        cache: &GenerationCache,
        package: &str,
        files: &[SchemaFile],
    ) -> ImportResult<Vec<Prerequisite>> {
        let mut plan = Plan {
            backend,
            search_path,
            cache,
            visiting: cache.in_progress().map(str::to_string).collect(),
            planned: IndexMap::new(),
        };
        self.visit(&mut plan, package, files)?;
        Ok(plan.planned.into_values().collect())
    }

    fn visit(&self, plan: &mut Plan<'_>, package: &str, files: &[SchemaFile]) -> ImportResult<()> {
        plan.visiting.insert(package.to_string());

        // First referencing file per dependency, the walk starts next to it
        let mut dependencies: IndexMap<String, PathBuf> = IndexMap::new();
        for schema in files {
            for reference in plan.backend.references(package, schema)? {
                if reference.package != package {
                    dependencies
                        .entry(reference.package)
                        .or_insert_with(|| schema.dir().to_path_buf());
                }
            }
        }

        for (dependency, origin) in dependencies {
            if plan.cache.contains(&dependency) || plan.planned.contains_key(&dependency) {
                continue;
            }
            if let Some(start) = plan.visiting.get_index_of(&dependency) {
                let mut cycle: Vec<String> = plan.visiting.iter().skip(start).cloned().collect();
                cycle.push(dependency);
                return Err(ImportError::DependencyCycle { cycle });
            }

            let dirs = self.locate(plan.search_path, &dependency, &origin);
            if dirs.is_empty() {
                return Err(ImportError::MissingDependency {
                    package: dependency,
                    required_by: package.to_string(),
                });
            }
            let prerequisite_files = message_files(&dirs)?;
            debug!(
                package = %dependency,
                required_by = package,
                files = prerequisite_files.len(),
                "planned prerequisite"
            );
            self.visit(plan, &dependency, &prerequisite_files)?;
            plan.planned.insert(
                dependency.clone(),
                Prerequisite {
                    package: dependency,
                    files: prerequisite_files,
                },
            );
        }

        plan.visiting.shift_remove(package);
        Ok(())
    }

    /// Message directories of `package`, recording new discoveries
    fn locate(&self, search_path: &mut SearchPathIndex, package: &str, origin: &Path) -> Vec<PathBuf> {
        if let Some(dirs) = search_path.get(package) {
            return dirs.iter().cloned().collect();
        }
        if let Some(dir) = self.walk(package, origin) {
            debug!(package, dir = %dir.display(), "found package by walking up");
            search_path.add(package, dir.clone());
            return vec![dir];
        }
        search_path.resolve(package)
    }

    /// Walk up from `start`, looking at each level for the package itself or
    /// for a sibling directory named after it
    ///
    /// The walk ends one level above the first directory holding the
    /// boundary marker, at the filesystem root, or after `max_depth` levels.
    pub fn walk(&self, package: &str, start: &Path) -> Option<PathBuf> {
        let msg = SchemaKind::Message.dir_name();
        let mut dir = Some(start);
        let mut crossed_boundary = false;

        for _ in 0..=self.bounds.max_depth {
            let current = dir?;
            if current.file_name().and_then(|n| n.to_str()) == Some(package)
                && current.join(msg).is_dir()
            {
                return Some(current.join(msg));
            }
            let sibling = current.join(package).join(msg);
            if sibling.is_dir() {
                return Some(sibling);
            }
            if crossed_boundary {
                return None;
            }
            crossed_boundary = current.join(&self.bounds.boundary_marker).is_file();
            dir = current.parent();
        }
        None
    }
}

/// Message definitions of a package spread over several directories. The
/// first directory wins when two define the same type.
fn message_files(dirs: &[PathBuf]) -> ImportResult<Vec<SchemaFile>> {
    let mut seen = IndexSet::new();
    let mut files = Vec::new();
    for dir in dirs {
        for file in list_kind_dir(dir, SchemaKind::Message)? {
            if seen.insert(file.type_name().to_string()) {
                files.push(file);
            }
        }
    }
    Ok(files)
}
