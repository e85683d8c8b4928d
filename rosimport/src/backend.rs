//! The generator seam.
//!
//! The core never looks inside a definition: it asks a [`SchemaBackend`] for
//! the types a file references and hands it whole kinds to generate.
//! [`RustBackend`] is the implementation built on `rosdef`.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use rosdef::codegen::{CodeGenerator, CodegenOptions};
use rosdef::msg::{InterfaceSpecification, parse_message_file, parse_service_file};
use rosdef::ParseError;
use tracing::debug;

use crate::error::{ImportError, ImportResult};
use crate::schema::{SchemaFile, SchemaKind};
use crate::search_path::SearchPathIndex;

/// A complex type named by a definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    /// Package owning the type
    pub package: String,
    /// Type name inside the package
    pub type_name: String,
}

/// One kind of one package, ready to generate
#[derive(Debug, Clone, Copy)]
pub struct GeneratorJob<'a> {
    /// Package being generated
    pub package: &'a str,
    /// Kind of every file in `files`
    pub kind: SchemaKind,
    /// Definitions, in generation order
    pub files: &'a [SchemaFile],
    /// Directory receiving the units (`<root>/<package>/<kind>`)
    pub output_dir: &'a Path,
    /// Include path context
    pub search_path: &'a SearchPathIndex,
    /// Message types generated for `package` in this run
    pub local_messages: &'a IndexSet<String>,
}

/// A unit written by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedUnit {
    /// Module name to declare in the kind entry point
    pub module_name: String,
    /// Written file
    pub path: PathBuf,
}

/// Parser and emitter used by the core
pub trait SchemaBackend {
    /// Types referenced by one definition file
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidSchemaSpec`] if the file is malformed.
    fn references(&self, package: &str, schema: &SchemaFile) -> ImportResult<Vec<TypeReference>>;

    /// Generate every file of a job into its output directory
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidSchemaSpec`] for a malformed definition
    /// and [`ImportError::GenerationFailure`] when emission itself fails.
    fn generate(&self, job: &GeneratorJob<'_>) -> ImportResult<Vec<EmittedUnit>>;
}

/// Backend emitting Rust modules with `rosdef`
#[derive(Debug, Clone, Default)]
pub struct RustBackend {
    generator: CodeGenerator,
}

impl RustBackend {
    /// Create a backend with the given emitter options
    #[must_use]
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            generator: CodeGenerator::new(options),
        }
    }

    fn parse(package: &str, schema: &SchemaFile) -> ImportResult<InterfaceSpecification> {
        let parsed = match schema.kind() {
            SchemaKind::Message => {
                parse_message_file(package, schema.path()).map(InterfaceSpecification::Message)
            }
            SchemaKind::Service => {
                parse_service_file(package, schema.path()).map(InterfaceSpecification::Service)
            }
        };
        parsed.map_err(|source| ImportError::InvalidSchemaSpec {
            path: schema.path().to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Reject references to types that will not exist under the output root
    fn check_types(
        job: &GeneratorJob<'_>,
        schema: &SchemaFile,
        spec: &InterfaceSpecification,
    ) -> ImportResult<()> {
        for reference in spec.references() {
            let Some(package) = reference.pkg_name.as_deref() else {
                continue;
            };
            let known = if package == job.package {
                job.local_messages.contains(&reference.type_name)
            } else if job.search_path.contains(package) {
                job.search_path
                    .find_type(package, &reference.type_name)
                    .is_some()
            } else {
                // Unknown packages were already rejected while resolving
                true
            };
            if !known {
                return Err(ImportError::InvalidSchemaSpec {
                    path: schema.path().to_path_buf(),
                    source: Box::new(ParseError::InvalidType {
                        type_string: reference.to_string(),
                        reason: format!("package '{package}' has no such message"),
                    }),
                });
            }
        }
        Ok(())
    }
}

impl SchemaBackend for RustBackend {
    fn references(&self, package: &str, schema: &SchemaFile) -> ImportResult<Vec<TypeReference>> {
        let spec = Self::parse(package, schema)?;
        Ok(spec
            .references()
            .into_iter()
            .filter_map(|t| {
                t.pkg_name.as_ref().map(|package| TypeReference {
                    package: package.clone(),
                    type_name: t.type_name.clone(),
                })
            })
            .collect())
    }

    fn generate(&self, job: &GeneratorJob<'_>) -> ImportResult<Vec<EmittedUnit>> {
        let mut units = Vec::with_capacity(job.files.len());
        for schema in job.files {
            let spec = Self::parse(job.package, schema)?;
            Self::check_types(job, schema, &spec)?;
            let unit = self
                .generator
                .generate(&spec)
                .map_err(|source| ImportError::GenerationFailure {
                    package: job.package.to_string(),
                    source: Box::new(source),
                })?;
            let path = unit.write_to_file(job.output_dir)?;
            debug!(unit = %unit.full_name, path = %path.display(), "emitted unit");
            units.push(EmittedUnit {
                module_name: unit.module_name,
                path,
            });
        }
        Ok(units)
    }
}
