//! PersonaServer: MCP method dispatch for the persona bridge.

use crate::client::PersonaApi;
use crate::resources::{self, PersonaResources};
use crate::tools::ToolSet;
use async_trait::async_trait;
use pmcp::server::cancellation::CancellationManager;
use pmcp::types::{
    ClientNotification, ClientRequest, Implementation, InitializeResult, ListToolsResult,
    Notification, ProtocolVersion, RequestId, ResourceCapabilities, ServerCapabilities,
    ToolCapabilities,
};
use pmcp::{RequestHandlerExtra, ResourceHandler};
use serde::Serialize;
use serde_json::{json, Value};
use server_common::RequestHandler;

pub const SERVER_NAME: &str = "persona-server";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Every MCP method this server answers.
pub const METHODS: [&str; 7] = [
    "initialize",
    "ping",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/templates/list",
    "resources/read",
];

/// Stateless bridge between MCP requests and the persona REST API.
#[derive(Debug)]
pub struct PersonaServer {
    api: PersonaApi,
    tools: ToolSet,
    resources: PersonaResources,
    cancellation: CancellationManager,
}

impl PersonaServer {
    pub fn new(api: PersonaApi) -> Self {
        Self {
            tools: ToolSet::new(&api),
            resources: PersonaResources::new(api.clone()),
            cancellation: CancellationManager::new(),
            api,
        }
    }

    pub fn api(&self) -> &PersonaApi {
        &self.api
    }

    pub fn initialize_result() -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion(PROTOCOL_VERSION.to_string()),
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities::default()),
                resources: Some(ResourceCapabilities::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: None,
        }
    }

    pub fn list_tools(&self) -> ListToolsResult {
        self.tools.list()
    }

    /// Register request `id` as cancellable and build its handler context.
    async fn begin(&self, id: &RequestId) -> RequestHandlerExtra {
        let key = id.to_string();
        let token = self.cancellation.create_token(key.clone()).await;
        RequestHandlerExtra::new(key, token)
    }

    async fn finish(&self, id: &RequestId) {
        self.cancellation.remove_token(&id.to_string()).await;
    }
}

#[async_trait]
impl RequestHandler for PersonaServer {
    async fn handle_request(
        &self,
        id: &RequestId,
        method: &str,
        params: Option<Value>,
    ) -> pmcp::Result<Value> {
        match decode(method, params)? {
            ClientRequest::Initialize(params) => {
                tracing::info!(
                    client = %params.client_info.name,
                    requested_version = %params.protocol_version,
                    "Initializing MCP session"
                );
                to_value(&Self::initialize_result())
            }
            ClientRequest::Ping => Ok(json!({})),
            ClientRequest::ListTools(_) => to_value(&self.list_tools()),
            ClientRequest::CallTool(request) => {
                let extra = self.begin(id).await;
                let result = self.tools.call(request, extra).await;
                self.finish(id).await;
                to_value(&result)
            }
            ClientRequest::ListResources(request) => {
                let extra = self.begin(id).await;
                let result = self.resources.list(request.cursor, extra).await;
                self.finish(id).await;
                to_value(&result?)
            }
            ClientRequest::ListResourceTemplates(_) => {
                to_value(&resources::list_resource_templates())
            }
            ClientRequest::ReadResource(request) => {
                let extra = self.begin(id).await;
                let result = self.resources.read(&request.uri, extra).await;
                self.finish(id).await;
                to_value(&result?)
            }
            _ => Err(pmcp::Error::method_not_found(method)),
        }
    }

    async fn handle_notification(&self, notification: Notification) {
        match notification {
            Notification::Client(ClientNotification::Initialized) => {
                tracing::info!("MCP session initialized")
            }
            Notification::Cancelled(cancelled)
            | Notification::Client(ClientNotification::Cancelled(cancelled)) => {
                tracing::debug!(
                    request_id = %cancelled.request_id,
                    reason = ?cancelled.reason,
                    "Cancelling request"
                );
                if let Err(e) = self
                    .cancellation
                    .cancel_request_silent(cancelled.request_id.to_string())
                    .await
                {
                    tracing::debug!(error = %e, "Cancellation failed");
                }
            }
            other => tracing::debug!(notification = ?other, "Ignoring notification"),
        }
    }
}

/// Decode `params` into the typed request for `method`.
///
/// Methods outside [`METHODS`] are unknown; a known method with the wrong
/// params is an invalid-params failure.
fn decode(method: &str, params: Option<Value>) -> pmcp::Result<ClientRequest> {
    if !METHODS.contains(&method) {
        return Err(pmcp::Error::method_not_found(method));
    }

    let envelope = match params {
        _ if method == "ping" => json!({ "method": method }),
        None | Some(Value::Null) => json!({ "method": method, "params": {} }),
        Some(params) => json!({ "method": method, "params": params }),
    };

    serde_json::from_value(envelope)
        .map_err(|e| pmcp::Error::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: Serialize>(value: &T) -> pmcp::Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| pmcp::Error::internal(format!("Serialization failed: {}", e)))
}
