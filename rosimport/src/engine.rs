//! Generation of one package into the output tree.
//!
//! Layout produced under the output root:
//!
//! ```text
//! <root>/mod.rs                  pub mod <package>; for every complete package
//! <root>/<package>/mod.rs        pub mod msg; pub mod srv;   (written last)
//! <root>/<package>/<kind>/mod.rs pub mod <unit>; pub use <unit>::*;
//! <root>/<package>/<kind>/<unit>.rs
//! ```
//!
//! A package counts as generated once its entry point exists, so a failure
//! anywhere before that leaves the package ungenerated.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use indexmap::IndexSet;
use tempfile::NamedTempFile;
use rosdef::codegen::sanitize_rust_identifier;
use tracing::{debug, error, warn};

use crate::artifact::{
    ENTRY_POINT_FILE, GeneratedArtifact, kind_dir, kind_entry_point, package_dir,
    package_entry_point,
};
use crate::backend::{EmittedUnit, GeneratorJob, SchemaBackend};
use crate::error::{ImportError, ImportResult, error_chain};
use crate::schema::{SchemaFile, SchemaKind, validate_package_name};
use crate::search_path::SearchPathIndex;

/// Bounded fixed-interval wait for files to become visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two checks
    pub interval: Duration,
    /// Number of sleeps before giving up
    pub attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            attempts: 50,
        }
    }
}

impl PollPolicy {
    /// Wait until `path` exists
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ArtifactRaceTimeout`] once the attempts are spent.
    pub fn wait_for(&self, path: &Path) -> ImportResult<()> {
        let mut waited = Duration::ZERO;
        for attempt in 0..=self.attempts {
            if path.exists() {
                return Ok(());
            }
            if attempt < self.attempts {
                thread::sleep(self.interval);
                waited += self.interval;
            }
        }
        Err(ImportError::ArtifactRaceTimeout {
            path: path.to_path_buf(),
            waited,
        })
    }
}

/// Writes packages into an output tree
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    poll: PollPolicy,
    header: Option<String>,
}

impl GenerationEngine {
    /// Create an engine; `header` is prepended to every entry point
    #[must_use]
    pub fn new(poll: PollPolicy, header: Option<String>) -> Self {
        Self { poll, header }
    }

    /// Generate `package` from `files` under `output_root`
    ///
    /// Messages are generated before services, each kind with a single
    /// backend call. The package's message directories are recorded in
    /// `search_path` on success.
    ///
    /// # Errors
    ///
    /// - [`ImportError::PkgAlreadyExists`] if the package entry point exists
    /// - [`ImportError::InvalidSchemaSpec`] and
    ///   [`ImportError::GenerationFailure`] from the backend
    /// - [`ImportError::ArtifactRaceTimeout`] if emitted files never appear
    pub fn generate(
        &self,
        backend: &dyn SchemaBackend,
        search_path: &mut SearchPathIndex,
        package: &str,
        files: &[SchemaFile],
        output_root: &Path,
    ) -> ImportResult<GeneratedArtifact> {
        validate_package_name(package)?;
        let entry_point = package_entry_point(output_root, package);
        if entry_point.exists() {
            return Err(ImportError::PkgAlreadyExists {
                package: package.to_string(),
                entry_point,
            });
        }

        let by_kind = split_by_kind(package, files);
        let local_messages: IndexSet<String> = by_kind[0]
            .iter()
            .map(|f| f.type_name().to_string())
            .collect();

        fs::create_dir_all(package_dir(output_root, package))?;
        let mut kinds = Vec::new();
        let mut emitted = Vec::new();
        for (kind, kind_files) in SchemaKind::ALL.into_iter().zip(&by_kind) {
            let dir = kind_dir(output_root, package, kind);
            if dir.exists() {
                debug!(package, dir = %dir.display(), "removing stale output");
                fs::remove_dir_all(&dir)?;
            }
            if kind_files.is_empty() {
                continue;
            }
            fs::create_dir_all(&dir)?;

            let job = GeneratorJob {
                package,
                kind,
                files: kind_files,
                output_dir: &dir,
                search_path: &*search_path,
                local_messages: &local_messages,
            };
            let units = backend.generate(&job).inspect_err(|err| {
                if matches!(err, ImportError::GenerationFailure { .. }) {
                    error!(package, %kind, error = %error_chain(err), "generator failed");
                }
            })?;
            for unit in &units {
                self.poll.wait_for(&unit.path)?;
            }

            let kind_entry = kind_entry_point(output_root, package, kind);
            fs::write(&kind_entry, self.kind_index(&units))?;
            emitted.extend(units.into_iter().map(|u| u.path));
            emitted.push(kind_entry);
            kinds.push(kind);
        }

        self.write_package_entry_point(package, &entry_point, &kinds)?;
        self.poll.wait_for(&entry_point)?;
        // The package is complete once its entry point exists; a stale root
        // index is repaired by the next refresh.
        if let Err(err) = self.refresh_root_index(output_root) {
            warn!(package, error = %err, "failed to refresh the root index");
        }

        for schema in &by_kind[0] {
            search_path.add(package, schema.dir().to_path_buf());
        }

        Ok(GeneratedArtifact::new(
            package.to_string(),
            output_root.to_path_buf(),
            kinds,
            emitted,
        ))
    }

    /// Rewrite `<root>/mod.rs` to list every package that has an entry point
    ///
    /// The index goes through a uniquely named temporary file and a rename,
    /// so readers never see it half written. Other writers may rename their
    /// own listing over ours, so the root is listed again after every rename
    /// and the index rewritten until the listing no longer changes.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Io`] if the root cannot be listed or written.
    pub fn refresh_root_index(&self, output_root: &Path) -> ImportResult<PathBuf> {
        let index = output_root.join(ENTRY_POINT_FILE);
        let mut listed = complete_packages(output_root)?;
        for _ in 0..=self.poll.attempts {
            self.write_root_index(output_root, &index, &listed)?;
            let current = complete_packages(output_root)?;
            if current == listed {
                return Ok(index);
            }
            debug!(index = %index.display(), "root listing changed, rewriting");
            listed = current;
        }
        warn!(index = %index.display(), "root listing kept changing, index may lag behind");
        Ok(index)
    }

    fn write_root_index(
        &self,
        output_root: &Path,
        index: &Path,
        packages: &[String],
    ) -> ImportResult<()> {
        let mut content = self.header_block();
        content.push_str("#![allow(non_snake_case)]\n\n");
        for package in packages {
            let _ = writeln!(content, "pub mod {};", sanitize_rust_identifier(package));
        }

        let mut staging = NamedTempFile::new_in(output_root)?;
        staging.write_all(content.as_bytes())?;
        staging.persist(index).map_err(|err| err.error)?;
        Ok(())
    }

    fn kind_index(&self, units: &[EmittedUnit]) -> String {
        let mut content = self.header_block();
        for unit in units {
            let module = &unit.module_name;
            let _ = writeln!(content, "pub mod {module};");
            let _ = writeln!(content, "pub use {module}::*;");
        }
        content
    }

    fn write_package_entry_point(
        &self,
        package: &str,
        entry_point: &Path,
        kinds: &[SchemaKind],
    ) -> ImportResult<()> {
        let mut content = self.header_block();
        for kind in kinds {
            let _ = writeln!(content, "pub mod {kind};");
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(entry_point)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(ImportError::PkgAlreadyExists {
                    package: package.to_string(),
                    entry_point: entry_point.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn header_block(&self) -> String {
        match &self.header {
            Some(header) => format!("{header}\n\n"),
            None => String::new(),
        }
    }
}

/// Sorted names of the packages under `output_root` that have an entry point
fn complete_packages(output_root: &Path) -> ImportResult<Vec<String>> {
    let mut packages = Vec::new();
    for entry in fs::read_dir(output_root)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.join(ENTRY_POINT_FILE).is_file() && rosdef::msg::is_valid_package_name(name) {
            packages.push(name.to_string());
        }
    }
    packages.sort();
    Ok(packages)
}

/// Files of `package` grouped by kind in generation order, first occurrence
/// of a type winning
fn split_by_kind(package: &str, files: &[SchemaFile]) -> [Vec<SchemaFile>; 2] {
    let mut by_kind: [Vec<SchemaFile>; 2] = [Vec::new(), Vec::new()];
    let mut seen = IndexSet::new();
    for file in files {
        if !seen.insert((file.kind(), file.type_name().to_string())) {
            warn!(package, path = %file.path().display(), "ignoring duplicate definition");
            continue;
        }
        let slot = match file.kind() {
            SchemaKind::Message => 0,
            SchemaKind::Service => 1,
        };
        by_kind[slot].push(file.clone());
    }
    by_kind
}
