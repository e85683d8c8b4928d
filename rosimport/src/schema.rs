//! Definition files and their kinds.
//!
//! The kind of a file is decided once, from its extension, when the file is
//! discovered. Everything downstream matches on [`SchemaKind`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// Kind of a definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SchemaKind {
    /// `.msg`: a plain field list
    Message,
    /// `.srv`: a request and a response field list
    Service,
}

impl SchemaKind {
    /// All kinds, in generation order. Services may use messages, never the
    /// other way round.
    pub const ALL: [SchemaKind; 2] = [SchemaKind::Message, SchemaKind::Service];

    /// Kind for a file extension
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "msg" => Some(SchemaKind::Message),
            "srv" => Some(SchemaKind::Service),
            _ => None,
        }
    }

    /// File extension of this kind
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            SchemaKind::Message => "msg",
            SchemaKind::Service => "srv",
        }
    }

    /// Name of the per-package directory holding this kind, both in source
    /// trees and in the output tree
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One definition file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaFile {
    path: PathBuf,
    kind: SchemaKind,
    type_name: String,
}

impl SchemaFile {
    /// Classify a definition file by its extension
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedSchema`] if the extension is neither
    /// `msg` nor `srv`, or the file stem is not UTF-8.
    pub fn new(path: impl Into<PathBuf>) -> ImportResult<Self> {
        let path = path.into();
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SchemaKind::from_extension);
        let type_name = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
        match (kind, type_name) {
            (Some(kind), Some(type_name)) => Ok(Self {
                path,
                kind,
                type_name,
            }),
            _ => Err(ImportError::UnsupportedSchema { path }),
        }
    }

    /// Path of the definition
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind of the definition
    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Type name: the file stem
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Directory holding the definition
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Check a package name the way the definition parser checks it
///
/// # Errors
///
/// Returns [`ImportError::InvalidPackageName`] otherwise.
pub fn validate_package_name(name: &str) -> ImportResult<()> {
    if rosdef::msg::is_valid_package_name(name) {
        Ok(())
    } else {
        Err(ImportError::InvalidPackageName {
            name: name.to_string(),
        })
    }
}

/// List the definitions of one kind in a directory, sorted by path
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if the directory cannot be read.
pub fn list_kind_dir(dir: &Path, kind: SchemaKind) -> ImportResult<Vec<SchemaFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(kind.extension()) {
            files.push(SchemaFile::new(path)?);
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Discover a package from its directory: the package name is the directory
/// name, the definitions are `msg/*.msg` followed by `srv/*.srv`
///
/// # Errors
///
/// Returns [`ImportError::InvalidPackageName`] if the directory name is not a
/// valid package name, or [`ImportError::Io`] if a kind directory cannot be
/// read.
pub fn discover_package(package_dir: &Path) -> ImportResult<(String, Vec<SchemaFile>)> {
    let name = package_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    validate_package_name(&name)?;

    let mut files = Vec::new();
    for kind in SchemaKind::ALL {
        files.extend(list_kind_dir(&package_dir.join(kind.dir_name()), kind)?);
    }
    Ok((name, files))
}
