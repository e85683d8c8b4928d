/// Error types for ROS definition parsing
use thiserror::Error;

/// Main error type for ROS definition parsing
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("Invalid resource name: {name} - {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error("Invalid type definition: {type_string} - {reason}")]
    InvalidType { type_string: String, reason: String },

    #[error("Invalid value: {value} for type {type_info} - {reason}")]
    InvalidValue {
        value: String,
        type_info: String,
        reason: String,
    },

    #[error("Invalid service specification: {reason}")]
    InvalidServiceSpecification { reason: String },

    #[error("Parse error at line {line}: {message}")]
    LineParseError { line: usize, message: String },

    #[error("Invalid file name: {name}")]
    InvalidFileName { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Helper function to create `InvalidResourceName` errors
#[must_use]
pub fn invalid_resource_name(name: &str, pattern: &str) -> ParseError {
    ParseError::InvalidResourceName {
        name: name.to_string(),
        reason: format!("should match pattern: {pattern}"),
    }
}

/// Helper function to create `InvalidValue` errors
#[must_use]
pub fn invalid_value(value: &str, type_info: &str, reason: &str) -> ParseError {
    ParseError::InvalidValue {
        value: value.to_string(),
        type_info: type_info.to_string(),
        reason: reason.to_string(),
    }
}

/// Helper function to create `InvalidType` errors
#[must_use]
pub fn invalid_type(type_string: &str, reason: &str) -> ParseError {
    ParseError::InvalidType {
        type_string: type_string.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let parse_err: ParseError = io_err.into();
        assert!(matches!(parse_err, ParseError::IoError(..)));
        assert!(parse_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_invalid_resource_name_helper() {
        let err = invalid_resource_name("bad-name", "[A-Za-z_]+");
        assert!(matches!(err, ParseError::InvalidResourceName { .. }));
        let msg = err.to_string();
        assert!(msg.contains("bad-name"));
        assert!(msg.contains("[A-Za-z_]+"));
    }

    #[test]
    fn test_line_error_display() {
        let err = ParseError::LineParseError {
            line: 42,
            message: "syntax error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("syntax error"));
    }
}
