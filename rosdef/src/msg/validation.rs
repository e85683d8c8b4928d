/// Validation utilities for ROS definition parsing
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseResult, invalid_value};

#[allow(missing_docs)]
pub const PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR: &str = "/";
#[allow(missing_docs)]
pub const COMMENT_DELIMITER: &str = "#";
#[allow(missing_docs)]
pub const CONSTANT_SEPARATOR: &str = "=";
#[allow(missing_docs)]
pub const SERVICE_REQUEST_RESPONSE_SEPARATOR: &str = "---";
#[allow(missing_docs)]
pub const SERVICE_REQUEST_MESSAGE_SUFFIX: &str = "Request";
#[allow(missing_docs)]
pub const SERVICE_RESPONSE_MESSAGE_SUFFIX: &str = "Response";
/// Package that owns the bare `Header` type
pub const HEADER_PACKAGE: &str = "std_msgs";
#[allow(missing_docs)]
pub const HEADER_TYPE: &str = "Header";

/// ROS primitive types
pub const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "char", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64",
    "uint64", "float32", "float64", "string", "time", "duration",
];

static VALID_PACKAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid regex"));

static VALID_MESSAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid regex"));

static VALID_FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid regex"));

/// Validate a package name (a dot-free token)
pub fn is_valid_package_name(name: &str) -> bool {
    VALID_PACKAGE_NAME_PATTERN.is_match(name)
}

/// Validate a message or service name
pub fn is_valid_message_name(name: &str) -> bool {
    VALID_MESSAGE_NAME_PATTERN.is_match(name)
}

/// Validate a field or constant name
pub fn is_valid_field_name(name: &str) -> bool {
    VALID_FIELD_NAME_PATTERN.is_match(name)
}

/// Check if a type string names a primitive type
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

/// Parsed value of a constant
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum PrimitiveValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            PrimitiveValue::Int(v) => write!(f, "{v}"),
            PrimitiveValue::UInt(v) => write!(f, "{v}"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::String(v) => f.write_str(v),
        }
    }
}

fn parse_integer_in_range(
    value_string: &str,
    primitive_type: &str,
    min: i128,
    max: i128,
) -> ParseResult<i128> {
    let value = value_string
        .trim()
        .parse::<i128>()
        .map_err(|_| invalid_value(value_string, primitive_type, "must be an integer"))?;
    if value < min || value > max {
        return Err(invalid_value(
            value_string,
            primitive_type,
            "value out of range",
        ));
    }
    Ok(value)
}

/// Parse a constant value for a primitive type
///
/// Boolean constants accept `True`/`False` in any case as well as `1`/`0`.
/// String constants keep their raw text, quotes included.
///
/// # Errors
///
/// Returns an error if:
/// - The primitive type is unknown or cannot hold constants (`time`, `duration`)
/// - The value cannot be parsed for the type, or is out of range
pub fn parse_primitive_value_string(
    primitive_type: &str,
    value_string: &str,
) -> ParseResult<PrimitiveValue> {
    let signed = |min: i128, max: i128| {
        parse_integer_in_range(value_string, primitive_type, min, max)
            .and_then(|v| {
                i64::try_from(v)
                    .map_err(|_| invalid_value(value_string, primitive_type, "value out of range"))
            })
            .map(PrimitiveValue::Int)
    };
    let unsigned = |max: i128| {
        parse_integer_in_range(value_string, primitive_type, 0, max)
            .and_then(|v| {
                u64::try_from(v)
                    .map_err(|_| invalid_value(value_string, primitive_type, "value out of range"))
            })
            .map(PrimitiveValue::UInt)
    };

    match primitive_type {
        "bool" => match value_string.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(PrimitiveValue::Bool(true)),
            "false" | "0" => Ok(PrimitiveValue::Bool(false)),
            _ => Err(invalid_value(
                value_string,
                primitive_type,
                "must be either 'True' / '1' or 'False' / '0'",
            )),
        },
        "byte" | "int8" => signed(i128::from(i8::MIN), i128::from(i8::MAX)),
        "char" | "uint8" => unsigned(i128::from(u8::MAX)),
        "int16" => signed(i128::from(i16::MIN), i128::from(i16::MAX)),
        "uint16" => unsigned(i128::from(u16::MAX)),
        "int32" => signed(i128::from(i32::MIN), i128::from(i32::MAX)),
        "uint32" => unsigned(i128::from(u32::MAX)),
        "int64" => signed(i128::from(i64::MIN), i128::from(i64::MAX)),
        "uint64" => unsigned(i128::from(u64::MAX)),
        "float32" | "float64" => value_string
            .trim()
            .parse::<f64>()
            .map(PrimitiveValue::Float)
            .map_err(|_| invalid_value(value_string, primitive_type, "must be a valid float")),
        "string" => Ok(PrimitiveValue::String(value_string.to_string())),
        _ => Err(invalid_value(
            value_string,
            primitive_type,
            "constants must have a non-time primitive type",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_package_name("std_msgs"));
        assert!(is_valid_package_name("pkgA"));
        assert!(!is_valid_package_name("my.pkg"));
        assert!(!is_valid_package_name("1pkg"));
        assert!(is_valid_message_name("TestMsg"));
        assert!(!is_valid_message_name("Test-Msg"));
        assert!(is_valid_field_name("x"));
        assert!(!is_valid_field_name("_x"));
    }

    #[test]
    fn test_parse_bool_values() {
        assert_eq!(
            parse_primitive_value_string("bool", "True").unwrap(),
            PrimitiveValue::Bool(true)
        );
        assert_eq!(
            parse_primitive_value_string("bool", "0").unwrap(),
            PrimitiveValue::Bool(false)
        );
        assert!(parse_primitive_value_string("bool", "yes").is_err());
    }

    #[test]
    fn test_parse_integer_ranges() {
        assert_eq!(
            parse_primitive_value_string("uint8", "255").unwrap(),
            PrimitiveValue::UInt(255)
        );
        assert!(parse_primitive_value_string("uint8", "256").is_err());
        assert!(parse_primitive_value_string("uint16", "-1").is_err());
        assert_eq!(
            parse_primitive_value_string("int8", "-128").unwrap(),
            PrimitiveValue::Int(-128)
        );
        assert_eq!(
            parse_primitive_value_string("uint64", "18446744073709551615").unwrap(),
            PrimitiveValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn test_time_constants_rejected() {
        assert!(parse_primitive_value_string("time", "0").is_err());
        assert!(parse_primitive_value_string("duration", "0").is_err());
    }
}
