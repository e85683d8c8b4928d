/// Core types for ROS definition parsing
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseResult, invalid_resource_name, invalid_type};
use crate::msg::validation::{
    HEADER_PACKAGE, HEADER_TYPE, PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR, PrimitiveValue,
    is_primitive_type, is_valid_field_name, is_valid_message_name, is_valid_package_name,
    parse_primitive_value_string,
};

/// Base type information (without array specifiers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseType {
    /// Package name for complex types (None for primitive types)
    pub pkg_name: Option<String>,
    /// Type name (e.g., "string", "int32", "Pose")
    pub type_name: String,
}

impl BaseType {
    /// Create a new `BaseType` from a type string
    ///
    /// A bare complex type resolves to `context_package_name`, except `Header`
    /// which always lives in `std_msgs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type string has more than one `/`, or if the
    /// package or type name is not a valid resource name.
    pub fn new(type_string: &str, context_package_name: &str) -> ParseResult<Self> {
        if is_primitive_type(type_string) {
            return Ok(BaseType {
                pkg_name: None,
                type_name: type_string.to_string(),
            });
        }

        let parts: Vec<&str> = type_string
            .split(PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR)
            .collect();

        let (pkg_name, type_name) = match parts.as_slice() {
            [name] if *name == HEADER_TYPE => (HEADER_PACKAGE, *name),
            [name] => (context_package_name, *name),
            [pkg, name] => (*pkg, *name),
            _ => return Err(invalid_type(type_string, "invalid type format")),
        };

        if !is_valid_package_name(pkg_name) {
            return Err(invalid_resource_name(pkg_name, "valid package name pattern"));
        }
        if !is_valid_message_name(type_name) {
            return Err(invalid_resource_name(
                type_name,
                "valid message name pattern",
            ));
        }

        Ok(BaseType {
            pkg_name: Some(pkg_name.to_string()),
            type_name: type_name.to_string(),
        })
    }

    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        self.pkg_name.is_none()
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref pkg) = self.pkg_name {
            write!(f, "{}/{}", pkg, self.type_name)
        } else {
            f.write_str(&self.type_name)
        }
    }
}

/// Type information including array specifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Type {
    /// Base type information
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub base_type: BaseType,
    /// Whether this is an array type
    pub is_array: bool,
    /// Array size (None for unbounded arrays)
    pub array_size: Option<u32>,
}

impl Type {
    /// Create a new Type from a type string
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The array brackets are malformed
    /// - The array size is not a positive integer
    /// - The base type string is invalid
    pub fn new(type_string: &str, context_package_name: &str) -> ParseResult<Self> {
        let Some(without_close) = type_string.strip_suffix(']') else {
            return Ok(Type {
                base_type: BaseType::new(type_string, context_package_name)?,
                is_array: false,
                array_size: None,
            });
        };

        let bracket_start = without_close
            .rfind('[')
            .ok_or_else(|| invalid_type(type_string, "ends with ']' but missing '['"))?;
        let array_spec = &without_close[bracket_start + 1..];
        let array_size = if array_spec.is_empty() {
            None
        } else {
            let size = array_spec.parse::<u32>().map_err(|_| {
                invalid_type(type_string, "array size must be a valid positive integer")
            })?;
            if size == 0 {
                return Err(invalid_type(type_string, "array size must be > 0"));
            }
            Some(size)
        };

        Ok(Type {
            base_type: BaseType::new(&without_close[..bracket_start], context_package_name)?,
            is_array: true,
            array_size,
        })
    }

    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        self.base_type.is_primitive_type()
    }

    /// Check if this is an unbounded array
    #[must_use]
    pub fn is_dynamic_array(&self) -> bool {
        self.is_array && self.array_size.is_none()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        if self.is_array {
            write!(f, "[")?;
            if let Some(size) = self.array_size {
                write!(f, "{size}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Constant definition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constant {
    /// Primitive type of the constant
    pub type_name: String,
    /// Name of the constant
    pub name: String,
    /// Value of the constant
    pub value: PrimitiveValue,
}

impl Constant {
    /// Create a new constant
    ///
    /// # Errors
    ///
    /// Returns an error if the type is not primitive, the name is invalid, or
    /// the value does not parse for the type.
    pub fn new(primitive_type: &str, name: &str, value_string: &str) -> ParseResult<Self> {
        if !is_primitive_type(primitive_type) {
            return Err(invalid_type(
                primitive_type,
                "constant type must be primitive",
            ));
        }
        if !is_valid_field_name(name) {
            return Err(invalid_resource_name(name, "valid constant name pattern"));
        }

        let value = parse_primitive_value_string(primitive_type, value_string)?;

        Ok(Constant {
            type_name: primitive_type.to_string(),
            name: name.to_string(),
            value,
        })
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.type_name, self.name, self.value)
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Type of the field
    pub field_type: Type,
    /// Name of the field
    pub name: String,
}

impl Field {
    /// Create a new field
    ///
    /// # Errors
    ///
    /// Returns an error if the field name is not a valid field name.
    pub fn new(field_type: Type, name: &str) -> ParseResult<Self> {
        if !is_valid_field_name(name) {
            return Err(invalid_resource_name(name, "valid field name pattern"));
        }
        Ok(Field {
            field_type,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_base_type() {
        let t = BaseType::new("int32", "pkg").unwrap();
        assert!(t.is_primitive_type());
        assert_eq!(t.to_string(), "int32");
    }

    #[test]
    fn test_complex_base_types() {
        let qualified = BaseType::new("geometry_msgs/Pose", "pkg").unwrap();
        assert_eq!(qualified.pkg_name.as_deref(), Some("geometry_msgs"));
        assert_eq!(qualified.type_name, "Pose");

        let local = BaseType::new("Other", "pkg").unwrap();
        assert_eq!(local.pkg_name.as_deref(), Some("pkg"));

        let header = BaseType::new("Header", "pkg").unwrap();
        assert_eq!(header.to_string(), "std_msgs/Header");

        assert!(BaseType::new("a/b/C", "pkg").is_err());
        assert!(BaseType::new("pkg/bad-name", "pkg").is_err());
    }

    #[test]
    fn test_array_types() {
        let dynamic = Type::new("float64[]", "pkg").unwrap();
        assert!(dynamic.is_dynamic_array());
        assert_eq!(dynamic.to_string(), "float64[]");

        let fixed = Type::new("pkgA/A[3]", "pkg").unwrap();
        assert_eq!(fixed.array_size, Some(3));
        assert_eq!(fixed.base_type.pkg_name.as_deref(), Some("pkgA"));

        assert!(Type::new("int32[0]", "pkg").is_err());
        assert!(Type::new("int32]", "pkg").is_err());
        assert!(Type::new("int32[x]", "pkg").is_err());
    }

    #[test]
    fn test_constant_must_be_primitive() {
        assert!(Constant::new("pkg/Foo", "X", "1").is_err());
        let c = Constant::new("int32", "X", "7").unwrap();
        assert_eq!(c.to_string(), "int32 X=7");
    }
}
