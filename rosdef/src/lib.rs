#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # ROS Definition Parser and Emitter
//!
//! Parses ROS `.msg` and `.srv` definition files and emits one Rust unit per
//! definition.
//!
//! ## Quick Start
//!
//! ```rust
//! use rosdef::{CodeGenerator, InterfaceSpecification, parse_message_string};
//!
//! let spec = parse_message_string("geometry_msgs", "Point", "float64 x\nfloat64 y\nfloat64 z\n")?;
//! assert_eq!(spec.full_name(), "geometry_msgs/Point");
//!
//! let unit = CodeGenerator::default()
//!     .generate(&InterfaceSpecification::Message(spec))
//!     .expect("point emits");
//! assert_eq!(unit.file_name(), "point.rs");
//! # Ok::<(), rosdef::ParseError>(())
//! ```
//!
//! ## Modules
//!
//! - [`msg`]: definition parser (`.msg`, `.srv`)
//! - [`codegen`]: Rust emitter for parsed definitions

/// ROS message/service parser
pub mod msg;

/// Rust code emitter
pub mod codegen;

pub use codegen::{
    CodeGenerator, CodegenError, CodegenOptions, GeneratedUnit, TypeMapper, unit_module_name,
};
pub use msg::{
    BaseType, Constant, Field, InterfaceSpecification, MessageSpecification, ParseError,
    ParseResult, PrimitiveValue, ServiceSpecification, Type, parse_interface_file,
    parse_message_file, parse_message_string, parse_service_file, parse_service_string,
};
