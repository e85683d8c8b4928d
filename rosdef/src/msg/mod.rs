//! ROS Message/Service Parser Module
//!
//! This module parses `.msg` and `.srv` definition files: one declaration per
//! line, `#` comments, `---` between a service's request and response.

/// Error types and handling
pub mod errors;
/// Message parsing functionality
pub mod message;
/// Service parsing functionality
pub mod service;
/// Core data structures
pub mod types;
/// Validation utilities
pub mod validation;

use std::collections::BTreeSet;
use std::path::Path;

pub use errors::{ParseError, ParseResult};
pub use message::{MessageSpecification, parse_message_file, parse_message_string};
pub use service::{ServiceSpecification, parse_service_file, parse_service_string};
pub use types::{BaseType, Constant, Field, Type};
pub use validation::{
    PRIMITIVE_TYPES, PrimitiveValue, is_valid_field_name, is_valid_message_name,
    is_valid_package_name, parse_primitive_value_string,
};

/// Interface specification that can be either a Message or a Service
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceSpecification {
    /// A message specification
    Message(MessageSpecification),
    /// A service specification
    Service(ServiceSpecification),
}

impl InterfaceSpecification {
    /// Get the package name
    #[must_use]
    pub fn package_name(&self) -> &str {
        match self {
            InterfaceSpecification::Message(spec) => &spec.pkg_name,
            InterfaceSpecification::Service(spec) => &spec.pkg_name,
        }
    }

    /// Get the interface name
    #[must_use]
    pub fn interface_name(&self) -> &str {
        match self {
            InterfaceSpecification::Message(spec) => &spec.msg_name,
            InterfaceSpecification::Service(spec) => &spec.srv_name,
        }
    }

    /// Get the full interface name (package/interface)
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.package_name(), self.interface_name())
    }

    /// Complex types this interface refers to
    #[must_use]
    pub fn references(&self) -> Vec<&BaseType> {
        match self {
            InterfaceSpecification::Message(spec) => spec.references(),
            InterfaceSpecification::Service(spec) => spec.references(),
        }
    }

    /// Other packages this interface depends on
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<String> {
        match self {
            InterfaceSpecification::Message(spec) => spec.dependencies(),
            InterfaceSpecification::Service(spec) => spec.dependencies(),
        }
    }
}

impl std::fmt::Display for InterfaceSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceSpecification::Message(spec) => write!(f, "{spec}"),
            InterfaceSpecification::Service(spec) => write!(f, "{spec}"),
        }
    }
}

/// Parse a `.msg` or `.srv` file, selected by its extension
///
/// # Errors
///
/// Returns [`ParseError::InvalidFileName`] for any other extension, or the
/// error of the underlying parser.
pub fn parse_interface_file<P: AsRef<Path>>(
    pkg_name: &str,
    file_path: P,
) -> ParseResult<InterfaceSpecification> {
    let path = file_path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("msg") => parse_message_file(pkg_name, path).map(InterfaceSpecification::Message),
        Some("srv") => parse_service_file(pkg_name, path).map(InterfaceSpecification::Service),
        _ => Err(ParseError::InvalidFileName {
            name: path.display().to_string(),
        }),
    }
}
