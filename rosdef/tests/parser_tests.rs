use rosdef::msg::{PrimitiveValue, parse_interface_file};
use rosdef::{InterfaceSpecification, ParseError, parse_message_file, parse_service_file};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a definition file under `<root>/<package>/<kind>/`
fn create_definition(dir: &TempDir, package: &str, kind: &str, file: &str, content: &str) -> PathBuf {
    let kind_dir = dir.path().join(package).join(kind);
    fs::create_dir_all(&kind_dir).unwrap();
    let file_path = kind_dir.join(file);
    fs::write(&file_path, content).unwrap();
    file_path
}

#[test]
fn test_parse_message_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_definition(
        &temp_dir,
        "sensor_msgs",
        "msg",
        "Range.msg",
        "Header header\nuint8 ULTRASOUND=0\nuint8 INFRARED=1\nuint8 radiation_type\nfloat32 range\n",
    );

    let spec = parse_message_file("sensor_msgs", &path).unwrap();
    assert_eq!(spec.full_name(), "sensor_msgs/Range");
    assert_eq!(spec.fields.len(), 3);
    assert_eq!(spec.constants.len(), 2);
    assert_eq!(
        spec.get_constant("INFRARED").unwrap().value,
        PrimitiveValue::UInt(1)
    );
    assert!(spec.dependencies().contains("std_msgs"));
}

#[test]
fn test_parse_service_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_definition(
        &temp_dir,
        "test_srvs",
        "srv",
        "SetMode.srv",
        "# request\nstring mode\n---\n# response\nbool ok\nstring message\n",
    );

    let spec = parse_service_file("test_srvs", &path).unwrap();
    assert_eq!(spec.full_name(), "test_srvs/SetMode");
    assert_eq!(spec.request.fields.len(), 1);
    assert_eq!(spec.response.fields.len(), 2);
}

#[test]
fn test_parse_interface_file_dispatch() {
    let temp_dir = TempDir::new().unwrap();
    let msg = create_definition(&temp_dir, "pkg", "msg", "Flag.msg", "bool x\n");
    let srv = create_definition(&temp_dir, "pkg", "srv", "Toggle.srv", "---\nbool x\n");
    let other = create_definition(&temp_dir, "pkg", "action", "Move.action", "");

    assert!(matches!(
        parse_interface_file("pkg", &msg).unwrap(),
        InterfaceSpecification::Message(_)
    ));
    assert!(matches!(
        parse_interface_file("pkg", &srv).unwrap(),
        InterfaceSpecification::Service(_)
    ));
    assert!(matches!(
        parse_interface_file("pkg", &other),
        Err(ParseError::InvalidFileName { .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pkg/msg/Nope.msg");
    assert!(matches!(
        parse_message_file("pkg", &path),
        Err(ParseError::IoError(_))
    ));
}

#[test]
fn test_invalid_field_type() {
    let err = rosdef::parse_message_string("pkg", "Bad", "int33[abc] value\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidType { .. }));
}

#[cfg(feature = "serde")]
#[test]
fn test_specification_serializes() {
    let spec = rosdef::parse_message_string("pkg", "Flag", "bool x\n").unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let back: rosdef::MessageSpecification = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, back);
}
