//! Rust code emitter for parsed ROS definitions
//!
//! Each definition file becomes one Rust unit (`<snake_name>.rs`). A message
//! unit holds a single struct; a service unit holds `<Srv>Request`,
//! `<Srv>Response` and a marker struct `<Srv>` carrying the service metadata.
//!
//! References to other types go through the output root, so a unit placed at
//! `<root>/<pkg>/<kind>/<unit>.rs` compiles as long as every referenced
//! package has been emitted under the same root.
//!
//! ```
//! use rosdef::codegen::CodeGenerator;
//! use rosdef::msg::{InterfaceSpecification, parse_message_string};
//!
//! let spec = parse_message_string("test_msgs", "TestMsg", "bool x\n").unwrap();
//! let unit = CodeGenerator::default()
//!     .generate(&InterfaceSpecification::Message(spec))
//!     .unwrap();
//! assert_eq!(unit.file_name(), "test_msg.rs");
//! assert!(unit.code.contains("pub x: bool"));
//! ```

mod tokens;
mod types;

pub use types::{IMPORT_DEPTH, MAX_FIXED_ARRAY_LEN, TypeMapper, sanitize_rust_identifier};

use std::fs;
use std::path::{Path, PathBuf};

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use thiserror::Error;

use crate::msg::{InterfaceSpecification, MessageSpecification, ServiceSpecification};
use tokens::{ConstantDef, StructField};

/// Errors that can occur while emitting Rust code
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The emitted tokens did not form a valid Rust file
    #[error("generated code for {type_name} is not valid Rust: {source}")]
    Format {
        /// Full ROS name of the type being emitted
        type_name: String,
        /// Underlying syn error
        #[source]
        source: syn::Error,
    },

    /// Writing the unit failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Options shared by every emitted unit
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Text placed verbatim at the top of each unit
    pub header: Option<String>,
    /// Derives applied to every generated struct
    pub derives: Vec<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            header: Some("// Auto-generated by rosimport. Do not edit.".to_string()),
            derives: ["Debug", "Clone", "Default", "PartialEq"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// One emitted Rust unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Module name under which the unit is declared (`test_msg`, `r#type`)
    pub module_name: String,
    /// Full ROS name of the definition (`pkg/Type`)
    pub full_name: String,
    /// Formatted Rust source
    pub code: String,
}

impl GeneratedUnit {
    /// File name the unit must be written to for `mod <module_name>;` to find it
    #[must_use]
    pub fn file_name(&self) -> String {
        let stem = self
            .module_name
            .strip_prefix("r#")
            .unwrap_or(&self.module_name);
        format!("{stem}.rs")
    }

    /// Write the unit into `dir`, returning the written path
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub fn write_to_file(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(self.file_name());
        fs::write(&path, &self.code)?;
        Ok(path)
    }
}

/// Module name of the unit generated for a definition named `name`
#[must_use]
pub fn unit_module_name(name: &str) -> String {
    sanitize_rust_identifier(&name.to_snake_case())
}

/// Emits Rust units from parsed definitions
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    options: CodegenOptions,
    mapper: TypeMapper,
}

impl CodeGenerator {
    /// Create a generator with the given options
    #[must_use]
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            mapper: TypeMapper::new(),
        }
    }

    /// Options this generator was built with
    #[must_use]
    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Emit the unit for any definition
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Format`] if the emitted code fails to parse.
    pub fn generate(&self, spec: &InterfaceSpecification) -> Result<GeneratedUnit, CodegenError> {
        match spec {
            InterfaceSpecification::Message(msg) => self.generate_message(msg),
            InterfaceSpecification::Service(srv) => self.generate_service(srv),
        }
    }

    /// Emit the unit for a message
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Format`] if the emitted code fails to parse.
    pub fn generate_message(
        &self,
        spec: &MessageSpecification,
    ) -> Result<GeneratedUnit, CodegenError> {
        let tokens = self.message_tokens(spec);
        self.finish(&spec.msg_name, spec.full_name(), tokens)
    }

    /// Emit the unit for a service
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Format`] if the emitted code fails to parse.
    pub fn generate_service(
        &self,
        spec: &ServiceSpecification,
    ) -> Result<GeneratedUnit, CodegenError> {
        let request = self.message_tokens(&spec.request);
        let response = self.message_tokens(&spec.response);

        let marker = tokens::ident(&sanitize_rust_identifier(&spec.srv_name));
        let request_name = spec.request.full_name();
        let response_name = spec.response.full_name();
        let full_name = spec.full_name();
        let definition = &spec.text;

        let service = quote! {
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct #marker;

            impl #marker {
                /// Full ROS type name.
                pub const TYPE_NAME: &'static str = #full_name;
                /// Definition text the type was generated from.
                pub const DEFINITION: &'static str = #definition;
                /// Full ROS name of the request type.
                pub const REQUEST_TYPE_NAME: &'static str = #request_name;
                /// Full ROS name of the response type.
                pub const RESPONSE_TYPE_NAME: &'static str = #response_name;
            }
        };

        let tokens = quote! {
            #request
            #response
            #service
        };
        self.finish(&spec.srv_name, full_name, tokens)
    }

    fn message_tokens(&self, spec: &MessageSpecification) -> TokenStream {
        let name = sanitize_rust_identifier(&spec.msg_name);
        let fields: Vec<StructField> = spec
            .fields
            .iter()
            .map(|f| StructField {
                name: sanitize_rust_identifier(&f.name),
                rust_type: self.mapper.map_type(&f.field_type),
            })
            .collect();
        let constants: Vec<ConstantDef> = spec
            .constants
            .iter()
            .map(|c| ConstantDef {
                name: sanitize_rust_identifier(&c.name),
                rust_type: TypeMapper::map_constant_type(&c.type_name).to_string(),
                value: c.value.clone(),
            })
            .collect();

        let item = tokens::generate_struct(&name, &self.options.derives, &fields);
        let meta = tokens::generate_type_impl(&name, &spec.full_name(), &spec.text, &constants);
        quote! {
            #item
            #meta
        }
    }

    fn finish(
        &self,
        name: &str,
        full_name: String,
        items: TokenStream,
    ) -> Result<GeneratedUnit, CodegenError> {
        let file = quote! {
            #![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]
            #items
        };
        let body = tokens::format_tokens(file).map_err(|source| CodegenError::Format {
            type_name: full_name.clone(),
            source,
        })?;
        let code = match &self.options.header {
            Some(header) => format!("{header}\n\n{body}"),
            None => body,
        };
        Ok(GeneratedUnit {
            module_name: unit_module_name(name),
            full_name,
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::{parse_message_string, parse_service_string};

    #[test]
    fn test_unit_module_name() {
        assert_eq!(unit_module_name("TestMsg"), "test_msg");
        assert_eq!(unit_module_name("AddTwoInts"), "add_two_ints");
        assert_eq!(unit_module_name("Type"), "r#type");
    }

    #[test]
    fn test_raw_module_file_name() {
        let unit = GeneratedUnit {
            module_name: "r#type".to_string(),
            full_name: "pkg/Type".to_string(),
            code: String::new(),
        };
        assert_eq!(unit.file_name(), "type.rs");
    }

    #[test]
    fn test_generate_message_unit() {
        let spec = parse_message_string("pkgB", "B", "pkgA/A dep\nuint8 MODE=1\n").unwrap();
        let unit = CodeGenerator::default().generate_message(&spec).unwrap();
        assert_eq!(unit.module_name, "b");
        assert_eq!(unit.full_name, "pkgB/B");
        assert!(unit.code.starts_with("// Auto-generated"));
        assert!(unit.code.contains("pub dep: super::super::super::pkgA::msg::A"));
        assert!(unit.code.contains("pub const MODE: u8 = 1"));
    }

    #[test]
    fn test_generate_service_unit() {
        let spec = parse_service_string("srvs", "AddTwoInts", "int64 a\nint64 b\n---\nint64 sum\n")
            .unwrap();
        let unit = CodeGenerator::default().generate_service(&spec).unwrap();
        assert_eq!(unit.file_name(), "add_two_ints.rs");
        assert!(unit.code.contains("pub struct AddTwoIntsRequest"));
        assert!(unit.code.contains("pub struct AddTwoIntsResponse"));
        assert!(unit.code.contains("pub struct AddTwoInts;"));
    }

    #[test]
    fn test_header_can_be_omitted() {
        let spec = parse_message_string("pkg", "Empty", "").unwrap();
        let generator = CodeGenerator::new(CodegenOptions {
            header: None,
            ..CodegenOptions::default()
        });
        let unit = generator.generate_message(&spec).unwrap();
        assert!(unit.code.starts_with("#![allow("));
    }
}
