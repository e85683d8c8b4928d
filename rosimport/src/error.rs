//! Error types for dependency-aware generation.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Dynamic error type carried as the source of backend failures.
pub type DynError = Box<dyn Error + Send + Sync + 'static>;

/// Result type using [`ImportError`].
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur while resolving or generating packages.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A referenced package could not be found through the include path, the
    /// upward filesystem walk or implicit resolution.
    #[error("package '{package}' required by '{required_by}' could not be found")]
    MissingDependency {
        /// The package that could not be located
        package: String,
        /// The package whose definitions reference it
        required_by: String,
    },

    /// A definition file is malformed.
    #[error("invalid definition {}: {source}", .path.display())]
    InvalidSchemaSpec {
        /// The offending definition file
        path: PathBuf,
        /// The parser error
        #[source]
        source: DynError,
    },

    /// The code generator failed internally.
    #[error("generation of package '{package}' failed: {source}")]
    GenerationFailure {
        /// Package being generated
        package: String,
        /// The generator error
        #[source]
        source: DynError,
    },

    /// Generated output never became visible on disk.
    #[error("{} did not appear after {waited:?}", .path.display())]
    ArtifactRaceTimeout {
        /// The path that was polled
        path: PathBuf,
        /// Total time spent polling
        waited: Duration,
    },

    /// The package entry point already exists and generation was invoked
    /// directly instead of through the cache.
    #[error("package '{package}' is already generated at {}", .entry_point.display())]
    PkgAlreadyExists {
        /// Package name
        package: String,
        /// The existing entry point
        entry_point: PathBuf,
    },

    /// Packages depend on each other in a loop.
    #[error("circular dependency between packages: {}", .cycle.join(" -> "))]
    DependencyCycle {
        /// Packages on the cycle, first package repeated at the end
        cycle: Vec<String>,
    },

    /// A package name is not a valid resource name.
    #[error("invalid package name '{name}'")]
    InvalidPackageName {
        /// The rejected name
        name: String,
    },

    /// A file is neither a message nor a service definition.
    #[error("unsupported definition file {}", .path.display())]
    UnsupportedSchema {
        /// The rejected path
        path: PathBuf,
    },

    /// An include path entry is not of the form `package:directory`.
    #[error("invalid include path entry '{entry}', expected 'package:directory'")]
    InvalidIncludePath {
        /// The rejected entry
        entry: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Whether this error leaves the requested package ungenerated because a
    /// dependency could not be found
    #[must_use]
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, ImportError::MissingDependency { .. })
    }
}

/// Render an error and every source below it on one line.
///
/// Variants of [`ImportError`] already print their direct source, so the
/// walk starts one level down.
pub(crate) fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source().and_then(Error::source);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
