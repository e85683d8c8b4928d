use rosdef::codegen::{CodegenOptions, MAX_FIXED_ARRAY_LEN};
use rosdef::{CodeGenerator, InterfaceSpecification, parse_message_string, parse_service_string};
use tempfile::TempDir;

/// Find a struct by name in generated code
fn find_struct<'a>(file: &'a syn::File, name: &str) -> &'a syn::ItemStruct {
    file.items
        .iter()
        .find_map(|item| match item {
            syn::Item::Struct(s) if s.ident == name => Some(s),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {name} not generated"))
}

/// Find a string constant in any impl block of generated code
fn find_str_const(file: &syn::File, name: &str) -> Option<String> {
    file.items.iter().find_map(|item| {
        let syn::Item::Impl(imp) = item else {
            return None;
        };
        imp.items.iter().find_map(|it| match it {
            syn::ImplItem::Const(c) if c.ident == name => match &c.expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
    })
}

#[test]
fn test_message_round_trips_through_syn() {
    let spec = parse_message_string("test_msgs", "TestMsg", "bool x\n").unwrap();
    let unit = CodeGenerator::default()
        .generate(&InterfaceSpecification::Message(spec))
        .unwrap();

    let file = syn::parse_file(&unit.code).unwrap();
    let item = find_struct(&file, "TestMsg");
    let fields: Vec<_> = item.fields.iter().collect();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].ident.as_ref().unwrap(), "x");
    let syn::Type::Path(ty) = &fields[0].ty else {
        panic!("field type is not a path");
    };
    assert!(ty.path.is_ident("bool"));
    assert_eq!(
        find_str_const(&file, "TYPE_NAME").as_deref(),
        Some("test_msgs/TestMsg")
    );
    assert_eq!(find_str_const(&file, "DEFINITION").as_deref(), Some("bool x\n"));
}

#[test]
fn test_service_unit_contains_both_halves() {
    let spec = parse_service_string(
        "test_srvs",
        "AddTwoInts",
        "int64 a\nint64 b\n---\nint64 sum\n",
    )
    .unwrap();
    let unit = CodeGenerator::default()
        .generate(&InterfaceSpecification::Service(spec))
        .unwrap();

    let file = syn::parse_file(&unit.code).unwrap();
    assert_eq!(find_struct(&file, "AddTwoIntsRequest").fields.len(), 2);
    assert_eq!(find_struct(&file, "AddTwoIntsResponse").fields.len(), 1);
    assert!(find_struct(&file, "AddTwoInts").fields.is_empty());
    assert_eq!(
        find_str_const(&file, "REQUEST_TYPE_NAME").as_deref(),
        Some("test_srvs/AddTwoIntsRequest")
    );
}

#[test]
fn test_keywords_and_arrays_emit_valid_rust() {
    let text = format!(
        "string type\nint32 match\nfloat64[3] small\nuint8[{}] large\nint8 NEG=-5\nfloat32 LOW=-1.5\n",
        MAX_FIXED_ARRAY_LEN + 1
    );
    let spec = parse_message_string("pkg", "Tricky", &text).unwrap();
    let unit = CodeGenerator::default().generate_message(&spec).unwrap();

    let file = syn::parse_file(&unit.code).unwrap();
    let item = find_struct(&file, "Tricky");
    let names: Vec<String> = item
        .fields
        .iter()
        .map(|f| f.ident.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["r#type", "r#match", "small", "large"]);
    assert!(unit.code.contains("pub small: [f64; 3]"));
    assert!(unit.code.contains("pub large: ::std::vec::Vec<u8>"));
    assert!(unit.code.contains("pub const NEG: i8 = -5"));
    assert!(unit.code.contains("pub const LOW: f32 = -1.5"));
}

#[test]
fn test_custom_derives_and_write() {
    let spec = parse_message_string("pkg", "Flag", "bool x\n").unwrap();
    let generator = CodeGenerator::new(CodegenOptions {
        header: Some("// custom header".to_string()),
        derives: vec!["Debug".to_string()],
    });
    let unit = generator.generate_message(&spec).unwrap();
    assert!(unit.code.starts_with("// custom header\n"));
    assert!(unit.code.contains("#[derive(Debug)]"));

    let temp_dir = TempDir::new().unwrap();
    let path = unit.write_to_file(temp_dir.path()).unwrap();
    assert_eq!(path, temp_dir.path().join("flag.rs"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), unit.code);
}
