//! Error taxonomy of the bridge.
//!
//! [`ApiError`] describes what went wrong talking to the REST API.
//! [`BridgeError`] is what the MCP host gets to see: tool calls render it as an
//! `isError` payload, resource reads raise it as a JSON-RPC fault.

use pmcp::ErrorCode;
use serde_json::json;

/// JSON-RPC code for an unknown resource, as used by MCP servers.
pub const RESOURCE_NOT_FOUND: ErrorCode = ErrorCode::other(-32002);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection refused, timeout, or any other transport failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON response from API: {0}")]
    Decode(String),

    #[error("Invalid API client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// A required field is missing or ill-typed. No remote call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persona with ID {id} not found")]
    NotFound { id: u64 },

    /// Malformed resource address.
    #[error("Invalid URI format: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl BridgeError {
    /// Translate an API failure for a call addressing persona `id`, if any.
    pub fn from_api(err: ApiError, id: Option<u64>) -> Self {
        match id {
            Some(id) if err.is_not_found() => BridgeError::NotFound { id },
            _ => BridgeError::Internal(format!("API Error: {}", err)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::Validation(_) => ErrorCode::INVALID_PARAMS,
            BridgeError::NotFound { .. } => RESOURCE_NOT_FOUND,
            BridgeError::InvalidRequest(_) => ErrorCode::INVALID_REQUEST,
            BridgeError::Internal(_) => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<BridgeError> for pmcp::Error {
    fn from(err: BridgeError) -> Self {
        let data = match &err {
            BridgeError::NotFound { id } => Some(json!({ "id": id })),
            BridgeError::InvalidRequest(uri) => Some(json!({ "uri": uri })),
            _ => None,
        };
        pmcp::Error::Protocol {
            code: err.code(),
            message: err.to_string(),
            data,
        }
    }
}

/// Text of the `isError` payload returned for a failed tool call.
pub fn failure_text(err: &pmcp::Error) -> String {
    match err {
        pmcp::Error::Protocol { message, .. } => message.clone(),
        pmcp::Error::Validation(message) => format!("Validation failed: {}", message),
        other => other.to_string(),
    }
}

impl From<validator::ValidationErrors> for BridgeError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BridgeError::Validation(errors.to_string())
    }
}
