//! A generation session.
//!
//! [`GenerationContext`] owns every piece of state that outlives one request:
//! the search path, the cache of generated packages and their artifacts.
//! Create one per build or import session and drop it at the end.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::artifact::{GeneratedArtifact, package_entry_point};
use crate::backend::{RustBackend, SchemaBackend};
use crate::cache::GenerationCache;
use crate::config::Config;
use crate::engine::GenerationEngine;
use crate::error::{ImportError, ImportResult};
use crate::locator::{ArtifactLocator, Location};
use crate::resolver::DependencyResolver;
use crate::schema::{SchemaFile, SchemaKind, discover_package, validate_package_name};
use crate::search_path::SearchPathIndex;

/// How a generation request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// The package was generated by this request
    Generated,
    /// The package was already generated; nothing was written
    AlreadyGenerated,
}

/// Result of a generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// The package's artifact
    pub artifact: GeneratedArtifact,
    /// Whether this request produced it
    pub status: GenerationStatus,
}

/// Session state shared by every generation request
pub struct GenerationContext {
    config: Config,
    backend: Box<dyn SchemaBackend>,
    search_path: SearchPathIndex,
    cache: GenerationCache,
    resolver: DependencyResolver,
    engine: GenerationEngine,
    locator: ArtifactLocator,
    artifacts: IndexMap<String, GeneratedArtifact>,
}

impl std::fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("output_root", &self.config.output_root())
            .field("search_path", &self.search_path)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl GenerationContext {
    /// Create a session emitting Rust with [`RustBackend`]
    ///
    /// # Errors
    ///
    /// Returns an error if the configured include path is malformed.
    pub fn new(config: Config) -> ImportResult<Self> {
        let options = rosdef::CodegenOptions {
            header: config.header().map(str::to_string),
            ..rosdef::CodegenOptions::default()
        };
        Self::with_backend(config, RustBackend::new(options))
    }

    /// Create a session using a custom backend
    ///
    /// # Errors
    ///
    /// Returns an error if the configured include path is malformed.
    pub fn with_backend(config: Config, backend: impl SchemaBackend + 'static) -> ImportResult<Self> {
        let mut search_path = SearchPathIndex::from_include_path(config.include_path())?;
        for root in config.search_roots() {
            search_path.add_root(root);
        }
        let resolver = DependencyResolver::new(config.walk_bounds());
        let engine = GenerationEngine::new(
            config.poll_policy(),
            config.header().map(str::to_string),
        );
        debug!(output_root = %config.output_root().display(), "generation context created");
        Ok(Self {
            config,
            backend: Box::new(backend),
            search_path,
            cache: GenerationCache::new(),
            resolver,
            engine,
            locator: ArtifactLocator,
            artifacts: IndexMap::new(),
        })
    }

    /// Generate `package` from `files`, and every package they depend on first
    ///
    /// A package already generated in this session, or already complete under
    /// the output root, is not touched again and comes back as
    /// [`GenerationStatus::AlreadyGenerated`].
    ///
    /// # Errors
    ///
    /// Any [`ImportError`] of resolution or generation. On error the requested
    /// package stays ungenerated; prerequisites completed before the error
    /// stay generated.
    pub fn generate<I, P>(&mut self, package: &str, files: I) -> ImportResult<GenerationOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        validate_package_name(package)?;
        let files = files
            .into_iter()
            .map(|p| SchemaFile::new(p.as_ref()))
            .collect::<ImportResult<Vec<_>>>()?;
        self.generate_files(package, &files)
    }

    /// Generate the package rooted at `package_dir` (its `msg/` and `srv/`
    /// definitions)
    ///
    /// # Errors
    ///
    /// As [`GenerationContext::generate`], plus
    /// [`ImportError::InvalidPackageName`] if the directory name is not a
    /// package name.
    pub fn generate_directory(&mut self, package_dir: &Path) -> ImportResult<GenerationOutcome> {
        let (package, files) = discover_package(package_dir)?;
        self.generate_files(&package, &files)
    }

    fn generate_files(
        &mut self,
        package: &str,
        files: &[SchemaFile],
    ) -> ImportResult<GenerationOutcome> {
        if let Some(outcome) = self.already_generated(package, files)? {
            return Ok(outcome);
        }

        let prerequisites = self.resolver.gather_prerequisites(
            self.backend.as_ref(),
            &mut self.search_path,
            &self.cache,
            package,
            files,
        )?;
        for prerequisite in prerequisites {
            self.generate_package(&prerequisite.package, &prerequisite.files)?;
        }
        self.generate_package(package, files)
    }

    /// Generate one package whose prerequisites are all generated
    fn generate_package(
        &mut self,
        package: &str,
        files: &[SchemaFile],
    ) -> ImportResult<GenerationOutcome> {
        if let Some(outcome) = self.already_generated(package, files)? {
            return Ok(outcome);
        }
        if !self.cache.begin(package) {
            return Err(ImportError::DependencyCycle {
                cycle: vec![package.to_string(), package.to_string()],
            });
        }

        let result = self.engine.generate(
            self.backend.as_ref(),
            &mut self.search_path,
            package,
            files,
            self.config.output_root(),
        );
        match result {
            Ok(artifact) => {
                self.cache.commit(package);
                info!(package, files = files.len(), "generated package");
                self.artifacts.insert(package.to_string(), artifact.clone());
                Ok(GenerationOutcome {
                    artifact,
                    status: GenerationStatus::Generated,
                })
            }
            Err(err) => {
                self.cache.abort(package);
                Err(err)
            }
        }
    }

    /// The soft skip: a package known to the session, or complete on disk
    fn already_generated(
        &mut self,
        package: &str,
        files: &[SchemaFile],
    ) -> ImportResult<Option<GenerationOutcome>> {
        if let Some(artifact) = self.artifacts.get(package) {
            debug!(package, "package already generated in this session");
            return Ok(Some(GenerationOutcome {
                artifact: artifact.clone(),
                status: GenerationStatus::AlreadyGenerated,
            }));
        }

        let output_root = self.config.output_root();
        if !package_entry_point(output_root, package).is_file() {
            return Ok(None);
        }
        let Some(artifact) = GeneratedArtifact::from_existing(output_root, package)? else {
            return Ok(None);
        };
        self.cache.once(package);
        for schema in files.iter().filter(|f| f.kind() == SchemaKind::Message) {
            self.search_path.add(package, schema.dir().to_path_buf());
        }
        info!(package, "package already present under the output root");
        self.artifacts.insert(package.to_string(), artifact.clone());
        Ok(Some(GenerationOutcome {
            artifact,
            status: GenerationStatus::AlreadyGenerated,
        }))
    }

    /// Root directory and module path of a generated package
    #[must_use]
    pub fn locate(&self, artifact: &GeneratedArtifact) -> Location {
        self.locator.locate(artifact)
    }

    /// Root directory and module path of one kind of a generated package
    #[must_use]
    pub fn locate_kind(&self, artifact: &GeneratedArtifact, kind: SchemaKind) -> Option<Location> {
        self.locator.locate_kind(artifact, kind)
    }

    /// Whether the package was generated in this session
    #[must_use]
    pub fn is_generated(&self, package: &str) -> bool {
        self.cache.contains(package)
    }

    /// Artifact of a package generated in this session
    #[must_use]
    pub fn artifact(&self, package: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.get(package)
    }

    /// Packages generated in this session, dependencies first
    pub fn generated_packages(&self) -> impl Iterator<Item = &str> {
        self.cache.packages()
    }

    /// Current search path
    #[must_use]
    pub fn search_path(&self) -> &SearchPathIndex {
        &self.search_path
    }

    /// Output root of the session
    #[must_use]
    pub fn output_root(&self) -> &Path {
        self.config.output_root()
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir) -> Config {
        Config::builder()
            .output_root(temp_dir.path().join("out"))
            .use_environment(false)
            .header(None::<String>)
            .build()
    }

    #[test]
    fn test_second_request_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let msg = temp_dir.path().join("pkg/msg");
        fs::create_dir_all(&msg).unwrap();
        fs::write(msg.join("Flag.msg"), "bool x\n").unwrap();

        let mut context = GenerationContext::new(config(&temp_dir)).unwrap();
        let first = context.generate("pkg", [msg.join("Flag.msg")]).unwrap();
        assert_eq!(first.status, GenerationStatus::Generated);
        let written = fs::read_to_string(first.artifact.files()[0].clone()).unwrap();

        let second = context.generate("pkg", [msg.join("Flag.msg")]).unwrap();
        assert_eq!(second.status, GenerationStatus::AlreadyGenerated);
        assert_eq!(second.artifact, first.artifact);
        assert_eq!(
            fs::read_to_string(second.artifact.files()[0].clone()).unwrap(),
            written
        );
        assert_eq!(context.generated_packages().collect::<Vec<_>>(), vec!["pkg"]);
    }

    #[test]
    fn test_package_on_disk_is_adopted() {
        let temp_dir = TempDir::new().unwrap();
        let msg = temp_dir.path().join("pkg/msg");
        fs::create_dir_all(&msg).unwrap();
        fs::write(msg.join("Flag.msg"), "bool x\n").unwrap();

        let mut first = GenerationContext::new(config(&temp_dir)).unwrap();
        first.generate("pkg", [msg.join("Flag.msg")]).unwrap();

        let mut second = GenerationContext::new(config(&temp_dir)).unwrap();
        let outcome = second.generate("pkg", [msg.join("Flag.msg")]).unwrap();
        assert_eq!(outcome.status, GenerationStatus::AlreadyGenerated);
        assert!(second.is_generated("pkg"));
        assert!(second.search_path().has_dir("pkg", &msg));
    }

    #[test]
    fn test_invalid_inputs() {
        let temp_dir = TempDir::new().unwrap();
        let mut context = GenerationContext::new(config(&temp_dir)).unwrap();
        assert!(matches!(
            context.generate("bad-name", Vec::<&Path>::new()),
            Err(ImportError::InvalidPackageName { .. })
        ));
        assert!(matches!(
            context.generate("pkg", ["/x/pkg/action/Move.action"]),
            Err(ImportError::UnsupportedSchema { .. })
        ));

        let bad_include = Config::builder().include_path("no-separator").build();
        assert!(matches!(
            GenerationContext::new(bad_include),
            Err(ImportError::InvalidIncludePath { .. })
        ));
    }
}
