//! Procedural macros for tui-relay

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(ActionKeys)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action_keys), supports(struct_named))]
struct ActionKeysOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<(), ActionKeyField>,

    /// Scope used by `create()`; defaults to the snake_case struct name
    #[darling(default)]
    scope: Option<String>,
}

/// Field-level attributes
#[derive(Debug, FromField)]
#[darling(attributes(action))]
struct ActionKeyField {
    ident: Option<syn::Ident>,

    /// Identifier segment to use instead of the field name
    #[darling(default)]
    rename: Option<String>,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Derive macro for the ActionKeySet trait
///
/// Every field must be an `ActionKey<_>`. Each key gets the identifier
/// `scope/field` and the debug symbol `Struct::field`.
///
/// # Attributes
///
/// - `#[action_keys(scope = "toolbar")]` on the struct sets the default
///   scope (otherwise the snake_case struct name)
/// - `#[action(rename = "save-all")]` on a field replaces the field name in
///   the identifier
///
/// # Example
/// ```ignore
/// #[derive(ActionKeys)]
/// #[action_keys(scope = "toolbar")]
/// struct Toolbar {
///     save: ActionKey<()>,
///     #[action(rename = "rename-doc")]
///     rename: ActionKey<String>,
/// }
///
/// let keys = Toolbar::create();
/// assert_eq!(keys.save.id().as_str(), "toolbar/save");
/// assert_eq!(keys.rename.id().as_str(), "toolbar/rename-doc");
///
/// // a second panel gets its own keys
/// let other = Toolbar::in_scope("panel-2");
/// assert_eq!(other.save.id().as_str(), "panel-2/save");
/// ```
#[proc_macro_derive(ActionKeys, attributes(action_keys, action))]
pub fn derive_action_keys(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionKeysOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let default_scope = opts
        .scope
        .clone()
        .unwrap_or_else(|| to_snake_case(&name.to_string()));

    let fields = match &opts.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        darling::ast::Data::Enum(_) => {
            return syn::Error::new_spanned(&input, "ActionKeys can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut inits = Vec::new();
    let mut ids = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let segment = field.rename.clone().unwrap_or_else(|| ident.to_string());
        let symbol = format!("{}::{}", name, ident);
        inits.push(quote! {
            #ident: tui_relay::ActionKey::in_scope(scope, #segment).with_debug_symbol(#symbol)
        });
        ids.push(quote! { self.#ident.id() });
    }

    let expanded = quote! {
        impl #impl_generics tui_relay::ActionKeySet for #name #ty_generics #where_clause {
            const DEFAULT_SCOPE: &'static str = #default_scope;

            fn in_scope(scope: &str) -> Self {
                Self {
                    #(#inits),*
                }
            }

            fn ids(&self) -> ::std::vec::Vec<&tui_relay::ActionId> {
                ::std::vec![#(#ids),*]
            }
        }
    };

    TokenStream::from(expanded)
}
