//! Record of one generated package.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ImportResult;
use crate::schema::SchemaKind;

/// Name of every entry point file in the output tree
pub const ENTRY_POINT_FILE: &str = "mod.rs";

/// Files generated for one package under one output root
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratedArtifact {
    package: String,
    output_root: PathBuf,
    kinds: Vec<SchemaKind>,
    files: Vec<PathBuf>,
    entry_point: PathBuf,
}

impl GeneratedArtifact {
    pub(crate) fn new(
        package: String,
        output_root: PathBuf,
        kinds: Vec<SchemaKind>,
        files: Vec<PathBuf>,
    ) -> Self {
        let entry_point = package_entry_point(&output_root, &package);
        Self {
            package,
            output_root,
            kinds,
            files,
            entry_point,
        }
    }

    /// Rebuild the record of a package already present on disk
    ///
    /// Returns `None` when the package entry point does not exist, since a
    /// package without one was never completely generated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ImportError::Io`] if a kind directory cannot be read.
    pub fn from_existing(output_root: &Path, package: &str) -> ImportResult<Option<Self>> {
        if !package_entry_point(output_root, package).is_file() {
            return Ok(None);
        }
        let mut kinds = Vec::new();
        let mut files = Vec::new();
        for kind in SchemaKind::ALL {
            let kind_entry = kind_entry_point(output_root, package, kind);
            if !kind_entry.is_file() {
                continue;
            }
            let mut units = Vec::new();
            for entry in fs::read_dir(kind_dir(output_root, package, kind))? {
                let path = entry?.path();
                let is_unit = path.extension().is_some_and(|e| e == "rs")
                    && path.file_name().is_some_and(|n| n != ENTRY_POINT_FILE);
                if is_unit {
                    units.push(path);
                }
            }
            units.sort();
            files.extend(units);
            files.push(kind_entry);
            kinds.push(kind);
        }
        Ok(Some(Self::new(
            package.to_string(),
            output_root.to_path_buf(),
            kinds,
            files,
        )))
    }

    /// Package name
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Output root the package was generated under
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Kinds generated for the package, in generation order
    #[must_use]
    pub fn kinds(&self) -> &[SchemaKind] {
        &self.kinds
    }

    /// Emitted units followed by their kind entry point, kind by kind
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Package entry point (`<root>/<package>/mod.rs`)
    #[must_use]
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }
}

/// `<root>/<package>`
pub(crate) fn package_dir(output_root: &Path, package: &str) -> PathBuf {
    output_root.join(package)
}

/// `<root>/<package>/mod.rs`
pub(crate) fn package_entry_point(output_root: &Path, package: &str) -> PathBuf {
    package_dir(output_root, package).join(ENTRY_POINT_FILE)
}

/// `<root>/<package>/<kind>`
pub(crate) fn kind_dir(output_root: &Path, package: &str, kind: SchemaKind) -> PathBuf {
    package_dir(output_root, package).join(kind.dir_name())
}

/// `<root>/<package>/<kind>/mod.rs`
pub(crate) fn kind_entry_point(output_root: &Path, package: &str, kind: SchemaKind) -> PathBuf {
    kind_dir(output_root, package, kind).join(ENTRY_POINT_FILE)
}
