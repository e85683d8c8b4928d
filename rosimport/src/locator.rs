//! Where a generated package can be loaded from.

use std::path::PathBuf;

use rosdef::codegen::sanitize_rust_identifier;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::artifact::{GeneratedArtifact, kind_entry_point};
use crate::schema::SchemaKind;

/// Root directory plus the module path to reach a generated module from it
///
/// Declaring `#[path = "<root_dir>/mod.rs"] mod <name>;` makes
/// `<name>::<module_path>` resolve to the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Output root holding the package directory and the root index
    pub root_dir: PathBuf,
    /// Module path below the root (`pkg`, `pkg::msg`)
    pub module_path: String,
    /// File defining that module
    pub entry_point: PathBuf,
}

/// Computes [`Location`]s from artifacts, without touching the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactLocator;

impl ArtifactLocator {
    /// Location of the package module
    #[must_use]
    pub fn locate(&self, artifact: &GeneratedArtifact) -> Location {
        Location {
            root_dir: artifact.output_root().to_path_buf(),
            module_path: sanitize_rust_identifier(artifact.package()),
            entry_point: artifact.entry_point().to_path_buf(),
        }
    }

    /// Location of one kind module of the package, if that kind was generated
    #[must_use]
    pub fn locate_kind(&self, artifact: &GeneratedArtifact, kind: SchemaKind) -> Option<Location> {
        if !artifact.kinds().contains(&kind) {
            return None;
        }
        Some(Location {
            root_dir: artifact.output_root().to_path_buf(),
            module_path: format!(
                "{}::{}",
                sanitize_rust_identifier(artifact.package()),
                kind.dir_name()
            ),
            entry_point: kind_entry_point(artifact.output_root(), artifact.package(), kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> GeneratedArtifact {
        GeneratedArtifact::new(
            "pkgB".to_string(),
            PathBuf::from("/tmp/rosimport/42"),
            vec![SchemaKind::Message],
            vec![PathBuf::from("/tmp/rosimport/42/pkgB/msg/b.rs")],
        )
    }

    #[test]
    fn test_locate() {
        let location = ArtifactLocator.locate(&artifact());
        assert_eq!(location.root_dir, PathBuf::from("/tmp/rosimport/42"));
        assert_eq!(location.module_path, "pkgB");
        assert_eq!(
            location.entry_point,
            PathBuf::from("/tmp/rosimport/42/pkgB/mod.rs")
        );
    }

    #[test]
    fn test_locate_kind() {
        let location = ArtifactLocator
            .locate_kind(&artifact(), SchemaKind::Message)
            .unwrap();
        assert_eq!(location.module_path, "pkgB::msg");
        assert_eq!(
            location.entry_point,
            PathBuf::from("/tmp/rosimport/42/pkgB/msg/mod.rs")
        );
        assert_eq!(ArtifactLocator.locate_kind(&artifact(), SchemaKind::Service), None);
    }
}
