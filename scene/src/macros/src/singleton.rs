use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitBool, parse_macro_input};

/// Guard flags gathered from the `#[singleton(...)]` attribute.
/// Baseline matches `GuardConfig::new()`: uniqueness on, placement off.
struct Flags {
    exclusive_on_node: bool,
    root_only: bool,
    unique_in_scene: bool,
}

impl Flags {
    fn baseline() -> Self {
        Self {
            exclusive_on_node: false,
            root_only: false,
            unique_in_scene: true,
        }
    }
}

pub fn derive_singleton(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // Get the struct name we are annotating
    let struct_name = &ast.ident;

    // Without the attribute the impl keeps the trait's `None` config default,
    // which the guard reports as a missing config when the instance wakes up.
    let Some(attr) = ast
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("singleton"))
    else {
        return TokenStream::from(quote! {
            impl ::lone_scene::singleton::Singleton for #struct_name {
            }
        });
    };

    let mut flags = Flags::baseline();
    match &attr.meta {
        // `#[singleton]` with no arguments takes the baseline as-is
        syn::Meta::Path(_) => {}
        syn::Meta::List(_) => {
            // Flags are either bare (`root_only`) or explicit (`root_only = true`)
            let parsed = attr.parse_nested_meta(|meta| {
                let value = if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<LitBool>()?.value
                } else {
                    true
                };

                if meta.path.is_ident("exclusive_on_node") {
                    flags.exclusive_on_node = value;
                } else if meta.path.is_ident("root_only") {
                    flags.root_only = value;
                } else if meta.path.is_ident("unique_in_scene") {
                    flags.unique_in_scene = value;
                } else {
                    return Err(meta.error(
                        "unknown singleton flag, expected one of \
                         `exclusive_on_node`, `root_only`, `unique_in_scene`",
                    ));
                }
                Ok(())
            });
            if let Err(err) = parsed {
                return TokenStream::from(err.to_compile_error());
            }
        }
        syn::Meta::NameValue(_) => {
            let err = syn::Error::new_spanned(attr, "expected #[singleton(...)]");
            return TokenStream::from(err.to_compile_error());
        }
    }

    let exclusive_on_node = flags.exclusive_on_node;
    let root_only = flags.root_only;
    let unique_in_scene = flags.unique_in_scene;

    TokenStream::from(quote! {
        impl ::lone_scene::singleton::Singleton for #struct_name {
            const CONFIG: ::core::option::Option<::lone_scene::singleton::GuardConfig> =
                ::core::option::Option::Some(::lone_scene::singleton::GuardConfig {
                    exclusive_on_node: #exclusive_on_node,
                    root_only: #root_only,
                    unique_in_scene: #unique_in_scene,
                });
        }
    })
}
