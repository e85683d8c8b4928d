//! Type mapping from ROS types to Rust types

use crate::msg::{BaseType, Type};

/// Arrays longer than this become `Vec<T>` so generated structs keep `Default`
pub const MAX_FIXED_ARRAY_LEN: u32 = 32;

/// Number of `super::` hops from a unit file (`<root>/<pkg>/<kind>/<unit>.rs`)
/// back to the output root module
pub const IMPORT_DEPTH: usize = 3;

/// Maps ROS types to Rust type strings
#[derive(Debug, Clone, Default)]
pub struct TypeMapper;

impl TypeMapper {
    /// Create a new type mapper
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map a ROS Type to a Rust type string
    #[must_use]
    pub fn map_type(&self, ros_type: &Type) -> String {
        let base = self.map_base_type(&ros_type.base_type);
        match (ros_type.is_array, ros_type.array_size) {
            (false, _) => base,
            (true, Some(size)) if size <= MAX_FIXED_ARRAY_LEN => format!("[{base}; {size}]"),
            (true, _) => format!("::std::vec::Vec<{base}>"),
        }
    }

    /// Map a base type to a Rust type string
    ///
    /// Complex types resolve through the output root:
    /// `super::super::super::<pkg>::msg::<Type>`.
    #[must_use]
    pub fn map_base_type(&self, base_type: &BaseType) -> String {
        if let Some(pkg) = &base_type.pkg_name {
            let root = "super::".repeat(IMPORT_DEPTH);
            return format!(
                "{root}{}::msg::{}",
                sanitize_rust_identifier(pkg),
                sanitize_rust_identifier(&base_type.type_name)
            );
        }
        Self::map_primitive(&base_type.type_name)
            .unwrap_or("()")
            .to_string()
    }

    /// Map a primitive type name to its Rust spelling
    #[must_use]
    pub fn map_primitive(type_name: &str) -> Option<&'static str> {
        Some(match type_name {
            "bool" => "bool",
            "byte" | "int8" => "i8",
            "char" | "uint8" => "u8",
            "int16" => "i16",
            "uint16" => "u16",
            "int32" => "i32",
            "uint32" => "u32",
            "int64" => "i64",
            "uint64" => "u64",
            "float32" => "f32",
            "float64" => "f64",
            "string" => "::std::string::String",
            // (secs, nsecs)
            "time" => "(u32, u32)",
            "duration" => "(i32, i32)",
            _ => return None,
        })
    }

    /// Rust type of an associated constant
    #[must_use]
    pub fn map_constant_type(type_name: &str) -> &'static str {
        match type_name {
            "string" => "&'static str",
            other => Self::map_primitive(other).unwrap_or("()"),
        }
    }
}

/// Sanitize an identifier to be valid Rust
///
/// - Escapes Rust keywords with r# prefix
/// - Suffixes the keywords that cannot be raw (`self`, `super`, ...) with `_`
/// - Converts invalid characters to underscores
#[must_use]
pub fn sanitize_rust_identifier(name: &str) -> String {
    if matches!(name, "self" | "Self" | "super" | "crate" | "_") {
        return format!("{name}_");
    }
    if is_rust_keyword(name) {
        return format!("r#{name}");
    }

    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}

fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "gen"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "try"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}
