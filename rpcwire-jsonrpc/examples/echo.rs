//! Very simple example which calls the `echo` method of a JSON-RPC service over HTTP, and prints
//! whatever comes back.
//!
//! Usage: `cargo run --example echo -- http://localhost:8080/ "Hello, world!"`
use rpcwire_jsonrpc::{Arguments, Client, JsonValue, MethodDescriptor, ServiceDescriptor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "rpcwire_jsonrpc=debug".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://localhost:8080/".to_string());
    let message = args.next().unwrap_or_else(|| "Hello, world!".to_string());

    let client = Client::builder().base_url(&base_url)?.build();
    let echo = client.bind(
        ServiceDescriptor::contract("Echo")
            .base_path("rpc")
            .method(MethodDescriptor::new("echo").param("message").returns::<JsonValue>()),
    )?;

    let response: JsonValue = echo
        .invoke("echo", Arguments::new().arg(&message))?
        .await?;
    println!("{response}");

    Ok(())
}
