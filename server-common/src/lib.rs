//! Shared stdio bootstrap for the MCP servers in this workspace.
//!
//! Binary servers implement [`RequestHandler`] and call [`run_stdio()`].
//! Framing is done here, over raw bytes, so a single bad line is answered with
//! a JSON-RPC error instead of ending the session.

use async_trait::async_trait;
use pmcp::types::jsonrpc::{JSONRPCError, JSONRPCRequest, JSONRPCResponse, JSONRPC_VERSION};
use pmcp::types::{Notification, RequestId};
use pmcp::ErrorCode;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const OUTBOUND_BUFFER: usize = 100;

/// CLI arguments shared across all MCP servers.
#[derive(Debug, Clone, clap::Args)]
pub struct CliArgs {
    /// Log filter used when RUST_LOG is not set (logs go to stderr)
    #[clap(long, default_value = "info")]
    pub log_filter: String,
}

/// Method-level handler for MCP traffic.
///
/// Each request is handled on its own task, so implementations must not rely
/// on requests arriving one at a time.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle_request(
        &self,
        id: &RequestId,
        method: &str,
        params: Option<Value>,
    ) -> pmcp::Result<Value>;

    async fn handle_notification(&self, notification: Notification) {
        tracing::debug!(?notification, "Notification received");
    }
}

/// Render a handler failure as a JSON-RPC error object.
///
/// Protocol errors keep their code and data. Validation failures are invalid
/// params. Everything else is an internal error.
pub fn error_object(err: &pmcp::Error) -> JSONRPCError {
    match err {
        pmcp::Error::Protocol {
            code,
            message,
            data,
        } => JSONRPCError {
            code: code.as_i32(),
            message: message.clone(),
            data: data.clone(),
        },
        pmcp::Error::Validation(message) => {
            JSONRPCError::new(ErrorCode::INVALID_PARAMS.as_i32(), message.clone())
        }
        other => JSONRPCError::new(
            other
                .error_code()
                .unwrap_or(ErrorCode::INTERNAL_ERROR)
                .as_i32(),
            other.to_string(),
        ),
    }
}

/// Run an MCP server over the stdio transport.
///
/// Initializes tracing (stderr only, stdout carries the protocol) and serves
/// until stdin closes.
pub async fn run_stdio<H: RequestHandler>(handler: Arc<H>, args: &CliArgs) -> anyhow::Result<()> {
    init_logging(&args.log_filter);

    tracing::info!("Starting MCP stdio server");

    serve(handler, tokio::io::stdin(), tokio::io::stdout()).await?;

    tracing::info!("stdin closed, MCP server exiting");

    Ok(())
}

/// A line written back to the host.
#[derive(Serialize)]
#[serde(untagged)]
enum Outbound {
    Response(JSONRPCResponse),
    /// Failure for a message whose id could not be recovered; `id` is always null.
    Unaddressed {
        jsonrpc: &'static str,
        id: Option<RequestId>,
        error: JSONRPCError,
    },
}

impl Outbound {
    fn unaddressed(code: ErrorCode, message: impl Into<String>) -> Self {
        Outbound::Unaddressed {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            error: JSONRPCError::new(code.as_i32(), message),
        }
    }

    fn failure(id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Outbound::Response(JSONRPCResponse::error(
            id,
            JSONRPCError::new(code.as_i32(), message),
        ))
    }
}

enum Inbound {
    Request(JSONRPCRequest),
    Notification(Value),
    Response,
}

/// Classify one framed line. `Err` carries the reply owed to the host.
fn classify(line: &[u8]) -> Result<Inbound, Outbound> {
    let value: Value = serde_json::from_slice(line).map_err(|e| {
        Outbound::unaddressed(ErrorCode::PARSE_ERROR, format!("Parse error: {}", e))
    })?;

    let Some(object) = value.as_object() else {
        return Err(Outbound::unaddressed(
            ErrorCode::INVALID_REQUEST,
            "Invalid request: expected a JSON object",
        ));
    };

    if !object.contains_key("method") {
        if object.contains_key("result") || object.contains_key("error") {
            return Ok(Inbound::Response);
        }
        return Err(Outbound::unaddressed(
            ErrorCode::INVALID_REQUEST,
            "Invalid request: missing method",
        ));
    }

    let Some(raw_id) = object.get("id") else {
        return Ok(Inbound::Notification(value));
    };

    // Only strings and i64 are usable ids. Anything else cannot be echoed back faithfully.
    let id: RequestId = serde_json::from_value(raw_id.clone()).map_err(|_| {
        Outbound::unaddressed(
            ErrorCode::INVALID_REQUEST,
            format!("Invalid request: unsupported id {}", raw_id),
        )
    })?;

    let request: JSONRPCRequest = serde_json::from_value(value).map_err(|e| {
        Outbound::failure(
            id.clone(),
            ErrorCode::INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )
    })?;

    match request.validate() {
        Ok(()) => Ok(Inbound::Request(request)),
        Err(e) => Err(Outbound::failure(id, ErrorCode::INVALID_REQUEST, e.to_string())),
    }
}

/// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`.
///
/// Returns once `reader` reaches EOF and every in-flight request has been answered.
pub async fn serve<H, R, W>(handler: Arc<H>, reader: R, writer: W) -> anyhow::Result<()>
where
    H: RequestHandler,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        tracing::trace!(line = %String::from_utf8_lossy(line), "MCP RX");

        match classify(line) {
            Ok(Inbound::Request(request)) => {
                let handler = handler.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = dispatch(handler.as_ref(), request).await;
                    if tx.send(Outbound::Response(response)).await.is_err() {
                        tracing::debug!("Writer closed before response was sent");
                    }
                });
            }
            Ok(Inbound::Notification(value)) => match pmcp::shared::parse_notification(value) {
                Ok(notification) => handler.handle_notification(notification).await,
                Err(e) => tracing::debug!(error = %e, "Ignoring notification"),
            },
            Ok(Inbound::Response) => {
                tracing::debug!("Ignoring response message from host");
            }
            Err(reply) => {
                tracing::warn!(line = %String::from_utf8_lossy(line), "Rejected malformed message");
                if tx.send(reply).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(tx);
    writer_task.await??;

    Ok(())
}

async fn dispatch<H: RequestHandler + ?Sized>(handler: &H, request: JSONRPCRequest) -> JSONRPCResponse {
    let JSONRPCRequest {
        id, method, params, ..
    } = request;
    tracing::debug!(%method, %id, "Handling request");

    match handler.handle_request(&id, &method, params).await {
        Ok(result) => JSONRPCResponse::success(id, result),
        Err(e) => {
            let error = error_object(&e);
            tracing::warn!(
                %method,
                code = error.code,
                message = %error.message,
                "Request failed"
            );
            JSONRPCResponse::error(id, error)
        }
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::Receiver<Outbound>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        let mut line = serde_json::to_string(&outbound)?;
        tracing::trace!(line = %line, "MCP TX");
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
