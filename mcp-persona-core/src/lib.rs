//! Persona MCP bridge core library.
//!
//! Provides `build_server()` which constructs a [`PersonaServer`]: an MCP
//! request handler exposing the persona REST API as tools and resources,
//! ready to be served over stdio.

pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod server;
pub mod tools;

use client::PersonaApi;
use config::ApiConfig;

pub use server::PersonaServer;

/// Build a fully-configured persona MCP server talking to the API described by `config`.
pub fn build_server(config: ApiConfig) -> pmcp::Result<PersonaServer> {
    let api = PersonaApi::new(&config)
        .map_err(|e| pmcp::Error::internal(format!("Failed to build API client: {}", e)))?;

    tracing::info!(
        api_url = %api.base_url(),
        timeout = ?config.timeout,
        authenticated = config.auth_token.is_some(),
        "Persona MCP server connecting to API"
    );

    Ok(PersonaServer::new(api))
}
