//! Typed JSON-RPC 2.0 service clients over HTTP.
//!
//! Declare a service contract as a trait, bind it to a [`Client`], and call its methods:
//!
//! ```rust,no_run
//! use rpcwire::{Call, Client, json_rpc_service};
//!
//! #[json_rpc_service("calc/")]
//! pub trait Calculator {
//!     fn plus(&self, #[param("a")] a: i32, #[param("b")] b: i32) -> Call<i32>;
//! }
//!
//! # async fn run() -> rpcwire::Result<()> {
//! let client = Client::builder().base_url("http://localhost:8080/")?.build();
//! let calculator = client.create::<CalculatorClient>()?;
//! assert_eq!(calculator.plus(1, 2).await?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! Without the `macros` feature, contracts are described with [`ServiceDescriptor`] and invoked
//! through [`ServiceHandle::invoke`].

pub use rpcwire_jsonrpc::*;

#[cfg(feature = "macros")]
pub use rpcwire_macros::json_rpc_service;
