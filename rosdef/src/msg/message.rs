/// Message specification parsing
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult};
use crate::msg::types::{BaseType, Constant, Field, Type};
use crate::msg::validation::{
    COMMENT_DELIMITER, CONSTANT_SEPARATOR, is_valid_message_name, is_valid_package_name,
};

/// Message specification
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageSpecification {
    /// Package name
    pub pkg_name: String,
    /// Message name
    pub msg_name: String,
    /// List of fields, in declaration order
    pub fields: Vec<Field>,
    /// List of constants, in declaration order
    pub constants: Vec<Constant>,
    /// The definition text this specification was parsed from
    pub text: String,
}

impl MessageSpecification {
    /// Create a new empty message specification
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidResourceName`] if the package name or message name are invalid.
    pub fn new(pkg_name: String, msg_name: String) -> ParseResult<Self> {
        if !is_valid_package_name(&pkg_name) {
            return Err(ParseError::InvalidResourceName {
                name: pkg_name,
                reason: "invalid package name pattern".to_string(),
            });
        }

        if !is_valid_message_name(&msg_name) {
            return Err(ParseError::InvalidResourceName {
                name: msg_name,
                reason: "invalid message name pattern".to_string(),
            });
        }

        Ok(MessageSpecification {
            pkg_name,
            msg_name,
            fields: Vec::new(),
            constants: Vec::new(),
            text: String::new(),
        })
    }

    /// Full type name (`package/Type`)
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.pkg_name, self.msg_name)
    }

    /// Get field by name
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get constant by name
    #[must_use]
    pub fn get_constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Complex types named by the fields, deduplicated, in declaration order
    #[must_use]
    pub fn references(&self) -> Vec<&BaseType> {
        let mut seen = BTreeSet::new();
        self.fields
            .iter()
            .map(|f| &f.field_type.base_type)
            .filter(|t| !t.is_primitive_type())
            .filter(|t| seen.insert(t.to_string()))
            .collect()
    }

    /// Packages other than this one that the fields refer to
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.references()
            .into_iter()
            .filter_map(|t| t.pkg_name.clone())
            .filter(|pkg| *pkg != self.pkg_name)
            .collect()
    }
}

impl std::fmt::Display for MessageSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}", self.full_name())?;
        for constant in &self.constants {
            writeln!(f, "{constant}")?;
        }
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Extract the type name from a definition file path, checking its extension
pub(crate) fn type_name_from_path(path: &Path, extension: &str) -> ParseResult<String> {
    let invalid = || ParseError::InvalidFileName {
        name: path.display().to_string(),
    };
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(invalid());
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Parse a message file
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or the message format is invalid.
pub fn parse_message_file<P: AsRef<Path>>(
    pkg_name: &str,
    interface_filename: P,
) -> ParseResult<MessageSpecification> {
    let path = interface_filename.as_ref();
    let msg_name = type_name_from_path(path, "msg")?;
    let content = fs::read_to_string(path)?;
    parse_message_string(pkg_name, &msg_name, &content)
}

/// Parse a message from string content
///
/// # Errors
///
/// Returns [`ParseError`] if the message format is invalid.
pub fn parse_message_string(
    pkg_name: &str,
    msg_name: &str,
    message_string: &str,
) -> ParseResult<MessageSpecification> {
    parse_message_lines(pkg_name, msg_name, message_string, 1)
}

/// Parse message declarations, numbering lines from `first_line`
pub(crate) fn parse_message_lines(
    pkg_name: &str,
    msg_name: &str,
    message_string: &str,
    first_line: usize,
) -> ParseResult<MessageSpecification> {
    let mut spec = MessageSpecification::new(pkg_name.to_string(), msg_name.to_string())?;
    spec.text = message_string.to_string();

    for (offset, raw_line) in message_string.lines().enumerate() {
        let line_num = first_line + offset;
        let line = raw_line.replace('\t', " ");
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_DELIMITER) {
            continue;
        }

        let Some((type_string, rest)) = line.split_once(' ') else {
            return Err(ParseError::LineParseError {
                line: line_num,
                message: format!("missing name after type '{line}'"),
            });
        };
        let rest = rest.trim_start();

        let clean = strip_comment(rest);
        if let Some((name, value)) = clean.split_once(CONSTANT_SEPARATOR) {
            // String constants keep everything after '=', '#' included
            let value = if type_string == "string" {
                rest.split_once(CONSTANT_SEPARATOR).map_or(value, |(_, raw)| raw)
            } else {
                value
            };
            spec.constants
                .push(Constant::new(type_string, name.trim(), value.trim())?);
            continue;
        }

        let name = clean.trim();
        if name.is_empty() || name.contains(' ') {
            return Err(ParseError::LineParseError {
                line: line_num,
                message: format!("expected '<type> <name>', found '{line}'"),
            });
        }
        if spec.get_field(name).is_some() {
            return Err(ParseError::LineParseError {
                line: line_num,
                message: format!("duplicate field name '{name}'"),
            });
        }

        let field_type = Type::new(type_string, pkg_name)?;
        spec.fields.push(Field::new(field_type, name)?);
    }

    Ok(spec)
}

fn strip_comment(s: &str) -> &str {
    s.split_once(COMMENT_DELIMITER).map_or(s, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_message() {
        let spec = parse_message_string("test_msgs", "TestMsg", "# header comment\nbool x\n")
            .unwrap();
        assert_eq!(spec.full_name(), "test_msgs/TestMsg");
        assert_eq!(spec.fields.len(), 1);
        assert_eq!(spec.fields[0].name, "x");
        assert!(spec.references().is_empty());
    }

    #[test]
    fn test_parse_constants() {
        let spec = parse_message_string(
            "test_msgs",
            "Consts",
            "uint8 MODE=2 # trailing\nstring GREETING=hello # world\nint32 value\n",
        )
        .unwrap();
        assert_eq!(spec.constants.len(), 2);
        assert_eq!(spec.get_constant("MODE").unwrap().value.to_string(), "2");
        assert_eq!(
            spec.get_constant("GREETING").unwrap().value.to_string(),
            "hello # world"
        );
        assert!(spec.get_field("value").is_some());
    }

    #[test]
    fn test_dependencies_exclude_own_package() {
        let spec = parse_message_string(
            "pkgB",
            "B",
            "pkgA/A dep\nLocal other\nHeader header\npkgA/A[] many\n",
        )
        .unwrap();
        let deps: Vec<_> = spec.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["pkgA".to_string(), "std_msgs".to_string()]);
        assert_eq!(spec.references().len(), 3);
    }

    #[test]
    fn test_invalid_lines_report_line_number() {
        let err = parse_message_string("pkg", "Bad", "bool x\nint32\n").unwrap_err();
        assert!(matches!(err, ParseError::LineParseError { line: 2, .. }));

        let err = parse_message_string("pkg", "Bad", "bool x\nbool x\n").unwrap_err();
        assert!(matches!(err, ParseError::LineParseError { line: 2, .. }));
    }

    #[test]
    fn test_type_name_from_path() {
        let name = type_name_from_path(Path::new("/a/msg/TestMsg.msg"), "msg").unwrap();
        assert_eq!(name, "TestMsg");
        assert!(type_name_from_path(Path::new("/a/msg/TestMsg.srv"), "msg").is_err());
    }
}
