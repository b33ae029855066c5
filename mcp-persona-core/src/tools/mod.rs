//! The persona tool set.
//!
//! The set is closed: [`Tool`] names every operation and [`ToolCall`] carries
//! its typed input, so each [`TypedTool`] is built by an exhaustive `match`
//! and forwards into one `execute` function.

pub mod create_persona;
pub mod delete_persona;
pub mod get_field_config;
pub mod get_persona;
pub mod list_personas;
pub mod update_persona;

use crate::client::PersonaApi;
use crate::error::{failure_text, BridgeError};
use pmcp::types::{CallToolRequest, CallToolResult, Content, ListToolsResult, ToolAnnotations};
use pmcp::{RequestHandlerExtra, ToolHandler, TypedTool};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Open-ended attribute group (demographic, psychographic, behavioral, contextual).
///
/// The remote API accepts arbitrary nested content here, so it stays a plain JSON object.
pub type AttributeGroup = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ListPersonas,
    GetPersona,
    CreatePersona,
    UpdatePersona,
    DeletePersona,
    GetFieldConfig,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::ListPersonas,
        Tool::GetPersona,
        Tool::CreatePersona,
        Tool::UpdatePersona,
        Tool::DeletePersona,
        Tool::GetFieldConfig,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ListPersonas => "list_personas",
            Tool::GetPersona => "get_persona",
            Tool::CreatePersona => "create_persona",
            Tool::UpdatePersona => "update_persona",
            Tool::DeletePersona => "delete_persona",
            Tool::GetFieldConfig => "get_field_config",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::ListPersonas => "Get a list of all personas with optional pagination.",
            Tool::GetPersona => "Get a specific persona by ID.",
            Tool::CreatePersona => {
                "Create a new persona. Attribute groups are free-form JSON objects."
            }
            Tool::UpdatePersona => {
                "Update an existing persona by ID. Only the supplied fields are sent."
            }
            Tool::DeletePersona => "Delete a persona by ID.",
            Tool::GetFieldConfig => {
                "Get field configuration, optionally filtered by category and field."
            }
        }
    }

    /// Build the MCP handler for this tool, bound to `api`.
    pub fn handler(self, api: PersonaApi) -> Box<dyn ToolHandler> {
        let writes = || ToolAnnotations::new().with_read_only(false);

        match self {
            Tool::ListPersonas => Box::new(
                TypedTool::new(self.name(), move |input: list_personas::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::ListPersonas(input).run(&api).await })
                })
                .with_description(self.description())
                .read_only()
                .open_world(),
            ),
            Tool::GetPersona => Box::new(
                TypedTool::new(self.name(), move |input: get_persona::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::GetPersona(input).run(&api).await })
                })
                .with_description(self.description())
                .read_only()
                .open_world(),
            ),
            Tool::CreatePersona => Box::new(
                TypedTool::new(self.name(), move |input: create_persona::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::CreatePersona(input).run(&api).await })
                })
                .with_description(self.description())
                .with_annotations(writes())
                .open_world(),
            ),
            Tool::UpdatePersona => Box::new(
                TypedTool::new(self.name(), move |input: update_persona::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::UpdatePersona(input).run(&api).await })
                })
                .with_description(self.description())
                .with_annotations(writes())
                .idempotent()
                .open_world(),
            ),
            Tool::DeletePersona => Box::new(
                TypedTool::new(self.name(), move |input: delete_persona::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::DeletePersona(input).run(&api).await })
                })
                .with_description(self.description())
                .destructive()
                .open_world(),
            ),
            Tool::GetFieldConfig => Box::new(
                TypedTool::new(self.name(), move |input: get_field_config::Input, _extra| {
                    let api = api.clone();
                    Box::pin(async move { ToolCall::GetFieldConfig(input).run(&api).await })
                })
                .with_description(self.description())
                .read_only()
                .open_world(),
            ),
        }
    }
}

/// A tool invocation with its arguments already decoded.
#[derive(Debug)]
pub enum ToolCall {
    ListPersonas(list_personas::Input),
    GetPersona(get_persona::Input),
    CreatePersona(create_persona::Input),
    UpdatePersona(update_persona::Input),
    DeletePersona(delete_persona::Input),
    GetFieldConfig(get_field_config::Input),
}

impl ToolCall {
    /// [`ToolCall::execute`] with the failure lifted into a protocol error.
    pub async fn run(self, api: &PersonaApi) -> pmcp::Result<Value> {
        Ok(self.execute(api).await?)
    }

    pub async fn execute(self, api: &PersonaApi) -> Result<Value, BridgeError> {
        match self {
            ToolCall::ListPersonas(input) => list_personas::execute(api, input).await,
            ToolCall::GetPersona(input) => get_persona::execute(api, input).await,
            ToolCall::CreatePersona(input) => create_persona::execute(api, input).await,
            ToolCall::UpdatePersona(input) => update_persona::execute(api, input).await,
            ToolCall::DeletePersona(input) => delete_persona::execute(api, input).await,
            ToolCall::GetFieldConfig(input) => get_field_config::execute(api, input).await,
        }
    }
}

/// One registered handler per [`Tool`].
pub struct ToolSet {
    handlers: HashMap<Tool, Box<dyn ToolHandler>>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(Tool::ALL.iter().filter(|tool| self.handlers.contains_key(tool)))
            .finish()
    }
}

impl ToolSet {
    pub fn new(api: &PersonaApi) -> Self {
        let handlers = Tool::ALL
            .into_iter()
            .map(|tool| (tool, tool.handler(api.clone())))
            .collect();
        Self { handlers }
    }

    /// Tool metadata, in [`Tool::ALL`] order.
    pub fn list(&self) -> ListToolsResult {
        ListToolsResult::new(
            Tool::ALL
                .iter()
                .filter_map(|tool| self.handlers.get(tool))
                .filter_map(|handler| handler.metadata())
                .collect(),
        )
    }

    /// Run a `tools/call` request to completion.
    ///
    /// Never fails at the protocol level: unknown tools and failed calls both
    /// come back as an `isError` result.
    pub async fn call(&self, request: CallToolRequest, extra: RequestHandlerExtra) -> CallToolResult {
        let name = request.name;
        let Some(handler) = Tool::from_name(&name).and_then(|tool| self.handlers.get(&tool)) else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return failure(format!("Unknown tool: {}", name));
        };

        let arguments = match request.arguments {
            Value::Null => Value::Object(Map::new()),
            arguments => arguments,
        };

        let outcome = tokio::select! {
            biased;
            () = extra.cancelled() => Err(pmcp::Error::cancelled()),
            outcome = handler.handle(arguments, extra.clone()) => outcome,
        };

        match outcome {
            Ok(value) => {
                tracing::info!(tool = %name, "Tool call succeeded");
                success(&value)
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call failed");
                failure(failure_text(&e))
            }
        }
    }
}

fn success(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult::new(vec![Content::Text { text }])
}

fn failure(text: String) -> CallToolResult {
    CallToolResult::error(vec![Content::Text { text }])
}
