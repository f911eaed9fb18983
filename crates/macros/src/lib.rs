use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, LitStr};

/// Builds a `TableCompatibilityIndex` from a compact literal.
///
/// Entries are separated by `;`, each one `table: platform platform ...`:
///
/// ```ignore
/// let index = schema!("users: darwin linux windows; windows_crashes: windows");
/// ```
#[proc_macro]
pub fn schema(input: TokenStream) -> TokenStream {
    let input_str = parse_macro_input!(input as LitStr);

    let mut definitions = Vec::new();
    for entry in input_str.value().split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let Some((name, platforms)) = entry.split_once(':') else {
            return syn::Error::new(
                input_str.span(),
                format!("expected `table: platforms...`, found `{}`", entry),
            )
            .to_compile_error()
            .into();
        };

        let name = name.trim();
        let platforms: Vec<&str> = platforms.split_whitespace().collect();

        definitions.push(quote! {
            ::tablecompat_core::analyzer::index::TableDefinition {
                name: #name.to_string(),
                platforms: vec![#(#platforms.to_string()),*],
            }
        });
    }

    quote! {
        {
            let definitions: ::std::vec::Vec<::tablecompat_core::analyzer::index::TableDefinition> =
                vec![#(#definitions),*];
            ::tablecompat_core::analyzer::index::TableCompatibilityIndex::from_definitions(definitions)
        }
    }
    .into()
}
