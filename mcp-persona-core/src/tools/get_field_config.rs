//! Read the field configuration, optionally narrowed to a category and field.

use crate::client::PersonaApi;
use crate::error::BridgeError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    /// Category name, e.g. "demographic"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    #[schemars(description = "Category name (optional)")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    #[schemars(description = "Field name (optional)")]
    pub field: Option<String>,
}

pub async fn execute(api: &PersonaApi, input: Input) -> Result<serde_json::Value, BridgeError> {
    input.validate()?;

    api.field_config(input.category.as_deref(), input.field.as_deref())
        .await
        .map_err(|e| BridgeError::from_api(e, None))
}
