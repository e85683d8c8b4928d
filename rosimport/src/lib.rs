#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # rosimport
//!
//! Dependency-aware, at-most-once generation of Rust modules from ROS
//! message (`.msg`) and service (`.srv`) definitions.
//!
//! Given the definition files of one package, a [`GenerationContext`]:
//!
//! 1. asks the backend which packages the definitions reference,
//! 2. locates each of them through the [`SearchPathIndex`], an upward walk
//!    from the referencing file, or the configured search roots,
//! 3. generates the missing ones first, dependencies before dependents,
//! 4. generates the package itself, messages before services,
//! 5. returns a [`GeneratedArtifact`] and, through [`ArtifactLocator`], the
//!    root directory and module path to load it from.
//!
//! Every package is generated at most once per context.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rosimport::{Config, GenerationContext};
//!
//! let mut context = GenerationContext::new(Config::default())?;
//! let outcome = context.generate_directory("ws/src/pkgB".as_ref())?;
//! let location = context.locate(&outcome.artifact);
//! println!("{} under {}", location.module_path, location.root_dir.display());
//! # Ok::<(), rosimport::ImportError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): [`logging::init_logging`] installs a
//!   `tracing-subscriber` fmt subscriber.
//! - `serde`: serialization of artifacts, locations and parsed definitions.

mod artifact;
mod backend;
mod cache;
mod config;
mod context;
mod engine;
mod error;
mod locator;
mod resolver;
mod schema;
mod search_path;

/// Logging setup
#[cfg(feature = "logging")]
pub mod logging;

pub use artifact::{ENTRY_POINT_FILE, GeneratedArtifact};
pub use backend::{EmittedUnit, GeneratorJob, RustBackend, SchemaBackend, TypeReference};
pub use cache::GenerationCache;
pub use config::{AMENT_PREFIX_PATH, Config, ConfigBuilder, ROS_PACKAGE_PATH};
pub use context::{GenerationContext, GenerationOutcome, GenerationStatus};
pub use engine::{GenerationEngine, PollPolicy};
pub use error::{DynError, ImportError, ImportResult};
pub use locator::{ArtifactLocator, Location};
pub use resolver::{DependencyResolver, Prerequisite, WalkBounds};
pub use schema::{
    SchemaFile, SchemaKind, discover_package, list_kind_dir, validate_package_name,
};
pub use search_path::{SearchPathIndex, SearchRoot};
