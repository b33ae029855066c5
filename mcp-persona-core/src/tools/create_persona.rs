//! Create a persona.
//!
//! The input is forwarded as the POST body. Attribute groups that were not
//! supplied are left out of the body entirely.

use crate::client::PersonaApi;
use crate::error::BridgeError;
use crate::tools::AttributeGroup;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[validate(length(min = 1))]
    #[schemars(description = "Persona name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Demographic data (location, language, age, occupation, ...)")]
    pub demographic: Option<AttributeGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Psychographic data (interests, values, attitudes, ...)")]
    pub psychographic: Option<AttributeGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Behavioral data (browsing habits, purchase history, ...)")]
    pub behavioral: Option<AttributeGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Contextual data (time of day, device, connection, ...)")]
    pub contextual: Option<AttributeGroup>,
}

pub async fn execute(api: &PersonaApi, input: Input) -> Result<serde_json::Value, BridgeError> {
    input.validate()?;

    tracing::info!(name = %input.name, "Creating persona");

    api.create_persona(&input)
        .await
        .map_err(|e| BridgeError::from_api(e, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_omits_absent_groups() {
        let input: Input = serde_json::from_value(json!({
            "name": "Night owl",
            "contextual": {"time_of_day": "night"}
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"name": "Night owl", "contextual": {"time_of_day": "night"}})
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let input: Input = serde_json::from_value(json!({"name": ""})).unwrap();
        assert!(input.validate().is_err());
    }
}
