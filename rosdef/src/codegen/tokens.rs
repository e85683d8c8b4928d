//! TokenStream-based code generation utilities
//!
//! Items are assembled with `quote` and pretty-printed with `prettyplease`,
//! so every unit that leaves this module has already been parsed by `syn`.

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{ToTokens, quote};
use std::str::FromStr;

use crate::msg::PrimitiveValue;

/// Parse a type string into a `TokenStream`
pub(super) fn parse_type(type_str: &str) -> TokenStream {
    if let Ok(tokens) = TokenStream::from_str(type_str.trim()) {
        return tokens;
    }
    let ident = Ident::new(type_str, Span::call_site());
    quote! { #ident }
}

/// Create an identifier, handling raw identifiers like `r#type`
pub(super) fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw_name) => Ident::new_raw(raw_name, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

/// Struct field information for code generation
#[derive(Debug, Clone)]
pub(super) struct StructField {
    /// Field name (already sanitized)
    pub(super) name: String,
    /// Rust type string
    pub(super) rust_type: String,
}

/// Constant definition for impl block generation
#[derive(Debug, Clone)]
pub(super) struct ConstantDef {
    pub(super) name: String,
    pub(super) rust_type: String,
    pub(super) value: PrimitiveValue,
}

/// Generate a struct definition with derives
pub(super) fn generate_struct(
    name: &str,
    derives: &[String],
    fields: &[StructField],
) -> TokenStream {
    let struct_name = ident(name);
    let derive_tokens: Vec<TokenStream> = derives.iter().map(|d| parse_type(d)).collect();

    let field_tokens: Vec<TokenStream> = fields
        .iter()
        .map(|f| {
            let field_name = ident(&f.name);
            let field_type = parse_type(&f.rust_type);
            quote! { pub #field_name: #field_type, }
        })
        .collect();

    quote! {
        #[derive(#(#derive_tokens),*)]
        pub struct #struct_name {
            #(#field_tokens)*
        }
    }
}

/// Generate the inherent impl carrying type metadata and constants
pub(super) fn generate_type_impl(
    struct_name: &str,
    full_name: &str,
    definition: &str,
    constants: &[ConstantDef],
) -> TokenStream {
    let name = ident(struct_name);
    let const_tokens: Vec<TokenStream> = constants
        .iter()
        .map(|c| {
            let const_name = ident(&c.name);
            let const_type = parse_type(&c.rust_type);
            let const_value = const_value(&c.value, &c.rust_type);
            quote! { pub const #const_name: #const_type = #const_value; }
        })
        .collect();

    quote! {
        impl #name {
            /// Full ROS type name.
            pub const TYPE_NAME: &'static str = #full_name;
            /// Definition text the type was generated from.
            pub const DEFINITION: &'static str = #definition;
            #(#const_tokens)*
        }
    }
}

/// Constant value tokens, typed by the constant's Rust type
fn const_value(value: &PrimitiveValue, rust_type: &str) -> TokenStream {
    match value {
        PrimitiveValue::Bool(b) => quote! { #b },
        PrimitiveValue::Int(v) if *v < 0 => {
            let magnitude = Literal::u64_unsuffixed(v.unsigned_abs());
            quote! { -#magnitude }
        }
        PrimitiveValue::Int(v) => Literal::i64_unsuffixed(*v).to_token_stream(),
        PrimitiveValue::UInt(v) => Literal::u64_unsuffixed(*v).to_token_stream(),
        PrimitiveValue::Float(v) if v.is_finite() && v.is_sign_negative() => {
            let magnitude = Literal::f64_unsuffixed(-*v);
            quote! { -#magnitude }
        }
        PrimitiveValue::Float(v) if v.is_finite() => {
            Literal::f64_unsuffixed(*v).to_token_stream()
        }
        PrimitiveValue::Float(v) => {
            let ty = ident(rust_type);
            let constant = if v.is_nan() {
                quote! { NAN }
            } else if v.is_sign_positive() {
                quote! { INFINITY }
            } else {
                quote! { NEG_INFINITY }
            };
            quote! { #ty::#constant }
        }
        PrimitiveValue::String(s) => Literal::string(s).to_token_stream(),
    }
}

/// Format a `TokenStream` into a pretty-printed string
pub(super) fn format_tokens(tokens: TokenStream) -> Result<String, syn::Error> {
    let syntax_tree = syn::parse2::<syn::File>(tokens)?;
    Ok(prettyplease::unparse(&syntax_tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec_type() {
        let tokens = parse_type("::std::vec::Vec<u8>");
        assert!(tokens.to_string().contains("Vec"));
    }

    #[test]
    fn test_raw_ident() {
        assert_eq!(ident("r#type").to_string(), "r#type");
        assert_eq!(ident("value").to_string(), "value");
    }

    #[test]
    fn test_generate_simple_struct() {
        let fields = vec![StructField {
            name: "x".to_string(),
            rust_type: "bool".to_string(),
        }];
        let tokens = generate_struct("TestMsg", &["Debug".to_string()], &fields);
        let code = format_tokens(tokens).unwrap();
        assert!(code.contains("pub struct TestMsg"));
        assert!(code.contains("pub x: bool"));
    }

    #[test]
    fn test_generate_type_impl_with_constants() {
        let constants = vec![
            ConstantDef {
                name: "MODE".to_string(),
                rust_type: "u8".to_string(),
                value: PrimitiveValue::UInt(2),
            },
            ConstantDef {
                name: "LIMIT".to_string(),
                rust_type: "f32".to_string(),
                value: PrimitiveValue::Float(f64::INFINITY),
            },
        ];
        let tokens = generate_type_impl("Consts", "pkg/Consts", "uint8 MODE=2", &constants);
        let code = format_tokens(tokens).unwrap();
        assert!(code.contains("pub const TYPE_NAME: &'static str = \"pkg/Consts\""));
        assert!(code.contains("pub const MODE: u8 = 2"));
        assert!(code.contains("f32::INFINITY"));
    }
}
