//! Persona MCP Server binary.
//!
//! Bridges the persona REST API to MCP hosts over stdin/stdout.

use clap::Parser;
use mcp_persona_core::config::{ApiConfig, DEFAULT_API_URL};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "persona-server",
    about = "Persona MCP Server",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[clap(flatten)]
    serve: ServeArgs,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the MCP server on stdio (default)
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ServeArgs {
    #[clap(flatten)]
    server: server_common::CliArgs,

    /// Base URL of the persona REST API
    #[clap(long, env = "PERSONA_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token sent with every API request
    #[clap(long, env = "PERSONA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
}

impl ServeArgs {
    fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(self.api_url.clone());
        match self.api_token {
            Some(ref token) => config.with_auth_token(token.clone()),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let args = match cli.command {
        Some(Command::Serve(args)) => args,
        None => cli.serve,
    };

    let server = Arc::new(mcp_persona_core::build_server(args.api_config())?);

    tokio::select! {
        result = server_common::run_stdio(server, &args.server) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, closing MCP channel");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = ServeArgs::parse_from(["persona-server"]);
        assert_eq!(args.server.log_filter, "info");
        if std::env::var_os("PERSONA_API_URL").is_none() {
            assert_eq!(args.api_url, DEFAULT_API_URL);
        }
    }

    #[test]
    fn test_serve_explicit_flags() {
        let args = ServeArgs::parse_from([
            "persona-server",
            "--api-url",
            "http://personas.test/api/v1",
            "--api-token",
            "s3cret",
        ]);
        let config = args.api_config();
        assert_eq!(config.base_url, "http://personas.test/api/v1");
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.timeout, ApiConfig::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_serve_subcommand() {
        let cli = Cli::parse_from(["persona-server", "serve", "--log-filter", "debug"]);
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.server.log_filter, "debug"),
            None => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_flags_without_subcommand() {
        let cli = Cli::parse_from(["persona-server", "--api-url", "http://10.0.0.5:5050/api/v1"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.api_url, "http://10.0.0.5:5050/api/v1");
    }
}
