//! Service declarations used by the integration tests, built with the descriptor API.
#![allow(dead_code)]

use std::sync::Arc;

use rpcwire_jsonrpc::{MethodDescriptor, ServiceDescriptor};

/// A calculator at the root of the server, with a mix of well- and badly-declared methods.
pub fn valid() -> Arc<ServiceDescriptor> {
    Arc::new(
        ServiceDescriptor::contract("Valid")
            .base_path("/")
            .method(
                MethodDescriptor::new("validNamedPlusMethod")
                    .rpc_name("plus")
                    .param("a")
                    .param("b")
                    .returns::<i32>(),
            )
            .method(
                MethodDescriptor::new("validUnnamedPlusMethod")
                    .rpc_name("plus")
                    .positional()
                    .param("a")
                    .param("b")
                    .returns::<i32>(),
            )
            .method(
                MethodDescriptor::new("invalidParamNamedPlusMethod")
                    .rpc_name("plus")
                    .untagged_param("a")
                    .param("b")
                    .returns::<i32>(),
            )
            .method(
                MethodDescriptor::new("invalidParamUnnamedPlusMethod")
                    .rpc_name("plus")
                    .positional()
                    .untagged_param("a")
                    .param("b")
                    .returns::<i32>(),
            )
            .method(
                MethodDescriptor::new("invalidReturnType")
                    .rpc_name("plus")
                    .param("a")
                    .param("b")
                    .returns_other("i32"),
            ),
    )
}

/// Extends [`valid`] and has its own base path
pub fn extending() -> ServiceDescriptor {
    ServiceDescriptor::contract("Extending").base_path("/").extends(valid())
}

/// Extends [`valid`] without a base path of its own
pub fn unannotated_extending() -> ServiceDescriptor {
    ServiceDescriptor::contract("UnannotatedExtending").extends(valid())
}

pub fn unannotated() -> ServiceDescriptor {
    ServiceDescriptor::contract("Unannotated")
}

pub fn type_param() -> Arc<ServiceDescriptor> {
    Arc::new(
        ServiceDescriptor::contract("TypeParam")
            .base_path("/")
            .type_param("T"),
    )
}

/// Looks concrete, but extends [`type_param`] with the parameter unresolved
pub fn extending_type_parameter() -> ServiceDescriptor {
    ServiceDescriptor::contract("ExtendingTypeParameter")
        .base_path("/")
        .extends(type_param())
}

pub fn invalid_class() -> ServiceDescriptor {
    ServiceDescriptor::concrete("InvalidClass").base_path("/")
}

/// A bank with business errors and structured results, mounted below the root
pub fn bank() -> ServiceDescriptor {
    ServiceDescriptor::contract("Bank")
        .base_path("bank/v1")
        .method(
            MethodDescriptor::new("withdraw")
                .param("account")
                .param("amount")
                .returns::<f64>(),
        )
        .method(MethodDescriptor::new("account").param("id"))
}
