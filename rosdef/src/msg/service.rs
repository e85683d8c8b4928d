/// Service specification parsing
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult};
use super::message::{MessageSpecification, parse_message_lines, type_name_from_path};
use super::types::BaseType;
use super::validation::{
    SERVICE_REQUEST_MESSAGE_SUFFIX, SERVICE_REQUEST_RESPONSE_SEPARATOR,
    SERVICE_RESPONSE_MESSAGE_SUFFIX, is_valid_message_name,
};

/// Service specification: a request and a response message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceSpecification {
    /// Package name
    pub pkg_name: String,
    /// Service name
    pub srv_name: String,
    /// Request message (`<Srv>Request`)
    pub request: MessageSpecification,
    /// Response message (`<Srv>Response`)
    pub response: MessageSpecification,
    /// The definition text this specification was parsed from
    pub text: String,
}

impl ServiceSpecification {
    /// Full type name (`package/Service`)
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.pkg_name, self.srv_name)
    }

    /// Complex types named by request and response, deduplicated
    #[must_use]
    pub fn references(&self) -> Vec<&BaseType> {
        let mut seen = BTreeSet::new();
        self.request
            .references()
            .into_iter()
            .chain(self.response.references())
            .filter(|t| seen.insert(t.to_string()))
            .collect()
    }

    /// Packages other than this one that request or response refer to
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = self.request.dependencies();
        deps.extend(self.response.dependencies());
        deps
    }
}

impl std::fmt::Display for ServiceSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.request)?;
        writeln!(f, "{SERVICE_REQUEST_RESPONSE_SEPARATOR}")?;
        write!(f, "{}", self.response)
    }
}

/// Parse a service file
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or the service format is invalid.
pub fn parse_service_file<P: AsRef<Path>>(
    pkg_name: &str,
    interface_filename: P,
) -> ParseResult<ServiceSpecification> {
    let path = interface_filename.as_ref();
    let srv_name = type_name_from_path(path, "srv")?;
    let content = fs::read_to_string(path)?;
    parse_service_string(pkg_name, &srv_name, &content)
}

/// Parse a service from string content
///
/// # Errors
///
/// Returns [`ParseError::InvalidServiceSpecification`] unless the text holds
/// exactly one `---` separator, or any error of the request/response parts.
pub fn parse_service_string(
    pkg_name: &str,
    srv_name: &str,
    service_string: &str,
) -> ParseResult<ServiceSpecification> {
    if !is_valid_message_name(srv_name) {
        return Err(ParseError::InvalidResourceName {
            name: srv_name.to_string(),
            reason: "invalid service name pattern".to_string(),
        });
    }

    let lines: Vec<&str> = service_string.lines().collect();
    let separators: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim() == SERVICE_REQUEST_RESPONSE_SEPARATOR)
        .map(|(i, _)| i)
        .collect();

    let [separator] = separators.as_slice() else {
        return Err(ParseError::InvalidServiceSpecification {
            reason: format!(
                "expected exactly one '{SERVICE_REQUEST_RESPONSE_SEPARATOR}' separator, found {}",
                separators.len()
            ),
        });
    };

    let request_text = lines[..*separator].join("\n");
    let response_text = lines[*separator + 1..].join("\n");

    let request = parse_message_lines(
        pkg_name,
        &format!("{srv_name}{SERVICE_REQUEST_MESSAGE_SUFFIX}"),
        &request_text,
        1,
    )?;
    let response = parse_message_lines(
        pkg_name,
        &format!("{srv_name}{SERVICE_RESPONSE_MESSAGE_SUFFIX}"),
        &response_text,
        separator + 2,
    )?;

    Ok(ServiceSpecification {
        pkg_name: pkg_name.to_string(),
        srv_name: srv_name.to_string(),
        request,
        response,
        text: service_string.to_string(),
    })
}
