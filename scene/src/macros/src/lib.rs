mod behavior;
mod singleton;

use proc_macro::TokenStream;

#[proc_macro_derive(Behavior)]
pub fn derive_behavior(item: TokenStream) -> TokenStream {
    behavior::derive_behavior(item)
}

#[proc_macro_derive(Singleton, attributes(singleton))]
pub fn derive_singleton(item: TokenStream) -> TokenStream {
    singleton::derive_singleton(item)
}
