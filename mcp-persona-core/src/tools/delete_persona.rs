use crate::client::PersonaApi;
use crate::error::BridgeError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[validate(range(min = 1))]
    #[schemars(description = "Persona ID")]
    pub id: u64,
}

pub async fn execute(api: &PersonaApi, input: Input) -> Result<serde_json::Value, BridgeError> {
    input.validate()?;

    tracing::info!(id = input.id, "Deleting persona");

    api.delete_persona(input.id)
        .await
        .map_err(|e| BridgeError::from_api(e, Some(input.id)))
}
