//! Procedural macros for `rpcwire`.
//!
//! Use them through the `rpcwire` crate, which re-exports them when the `macros` feature is
//! enabled; the generated code refers to items by their `::rpcwire::` paths.

use proc_macro::TokenStream;
use syn::{ItemTrait, parse_macro_input};

mod service;

/// Declare a JSON-RPC service contract from a trait.
///
/// ```rust,ignore
/// use rpcwire::{Call, json_rpc_service};
///
/// #[json_rpc_service("calc/")]
/// pub trait Calculator {
///     /// Named params: `{"a": 1, "b": 2}`
///     fn plus(&self, #[param("a")] a: i32, #[param("b")] b: i32) -> Call<i32>;
///
///     /// Positional params, with a different name on the wire: `[1, 2]`
///     #[rpc(name = "minus", positional)]
///     fn subtract(&self, #[param("a")] a: i32, #[param("b")] b: i32) -> Call<i32>;
///
///     /// Methods with a body run locally and are never sent
///     fn double(&self, a: i32) -> i32 {
///         a * 2
///     }
/// }
/// ```
///
/// This generates:
///
/// - a `CalculatorClient` struct, created with `Client::create::<CalculatorClient>()`, which
///   implements `ServiceAdapter` and describes the contract;
/// - an implementation of `Calculator` for `CalculatorClient`, and for the client of every contract
///   that extends `Calculator`.
///
/// The base path argument is optional when a supertrait contract provides one.  A contract extending
/// others must list all of its ancestor contracts as supertraits, not just its direct parents.
///
/// Methods without a body must take `&self` and return `Call<T>`.  Every parameter needs a
/// `#[param("...")]` name tag; a method with an untagged parameter compiles, but every invocation
/// of it fails with a configuration error.
#[proc_macro_attribute]
pub fn json_rpc_service(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as service::ServiceArgs);
    let item: proc_macro2::TokenStream = input.into();

    match syn::parse2::<ItemTrait>(item.clone()) {
        Ok(item_trait) => service::json_rpc_service_impl(args, item_trait)
            .unwrap_or_else(|err| err.to_compile_error())
            .into(),
        Err(_) => syn::Error::new_spanned(
            item,
            "#[json_rpc_service] must be applied to a trait; API declarations must be contracts",
        )
        .to_compile_error()
        .into(),
    }
}
