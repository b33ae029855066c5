//! Update a persona.
//!
//! Everything except `id` goes into the PUT body. Fields the caller did not
//! supply are omitted so the API leaves them untouched, while an attribute
//! group given as `null` is sent as `null`.

use crate::client::PersonaApi;
use crate::error::BridgeError;
use crate::tools::AttributeGroup;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[validate(range(min = 1))]
    #[schemars(description = "Persona ID")]
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    #[schemars(description = "Persona name")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Demographic data, or null to clear it")]
    pub demographic: Option<Option<AttributeGroup>>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Psychographic data, or null to clear it")]
    pub psychographic: Option<Option<AttributeGroup>>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Behavioral data, or null to clear it")]
    pub behavioral: Option<Option<AttributeGroup>>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Contextual data, or null to clear it")]
    pub contextual: Option<Option<AttributeGroup>>,
}

/// Absent stays `None`; an explicit `null` becomes `Some(None)`.
fn explicit<'de, D>(deserializer: D) -> Result<Option<Option<AttributeGroup>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<AttributeGroup>::deserialize(deserializer).map(Some)
}

/// PUT body: the input minus its `id`.
#[derive(Debug, Serialize)]
struct Body<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    demographic: Option<Option<&'a AttributeGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    psychographic: Option<Option<&'a AttributeGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    behavioral: Option<Option<&'a AttributeGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contextual: Option<Option<&'a AttributeGroup>>,
}

impl<'a> From<&'a Input> for Body<'a> {
    fn from(input: &'a Input) -> Self {
        Self {
            name: input.name.as_deref(),
            demographic: input.demographic.as_ref().map(Option::as_ref),
            psychographic: input.psychographic.as_ref().map(Option::as_ref),
            behavioral: input.behavioral.as_ref().map(Option::as_ref),
            contextual: input.contextual.as_ref().map(Option::as_ref),
        }
    }
}

pub async fn execute(api: &PersonaApi, input: Input) -> Result<serde_json::Value, BridgeError> {
    input.validate()?;

    tracing::info!(id = input.id, "Updating persona");

    api.update_persona(input.id, &Body::from(&input))
        .await
        .map_err(|e| BridgeError::from_api(e, Some(input.id)))
}
