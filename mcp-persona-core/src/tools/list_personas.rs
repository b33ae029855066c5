//! List personas, optionally paginated.

use crate::client::PersonaApi;
use crate::error::BridgeError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    /// Page number (starts at 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    #[schemars(description = "Page number (starts at 1)")]
    pub page: Option<u32>,

    /// Number of items per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    #[schemars(description = "Number of items per page")]
    pub per_page: Option<u32>,
}

pub async fn execute(api: &PersonaApi, input: Input) -> Result<serde_json::Value, BridgeError> {
    input.validate()?;

    api.list_personas(input.page, input.per_page)
        .await
        .map_err(|e| BridgeError::from_api(e, None))
}
