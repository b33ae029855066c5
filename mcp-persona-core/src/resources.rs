//! MCP resources for personas.
//!
//! - `persona://schema`: static JSON Schema describing a persona
//! - `persona://{id}`: the persona's current representation, fetched live
//!
//! Unlike tool calls, failed reads are protocol faults.

use crate::client::PersonaApi;
use crate::error::BridgeError;
use async_trait::async_trait;
use pmcp::types::{
    Content, ListResourceTemplatesResult, ListResourcesResult, ReadResourceResult, ResourceInfo,
    ResourceTemplate,
};
use pmcp::{RequestHandlerExtra, ResourceHandler};
use serde_json::{json, Value};
use std::sync::OnceLock;

pub const JSON_MIME_TYPE: &str = "application/json";

pub const SCHEMA_URI: &str = "persona://schema";
pub const PERSONA_URI_PREFIX: &str = "persona://";
pub const PERSONA_URI_TEMPLATE: &str = "persona://{id}";

/// A parsed resource address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAddress {
    Schema,
    Persona(u64),
}

impl ResourceAddress {
    /// Accepts the schema URI or `persona://<digits>`; anything else is an invalid request.
    pub fn parse(uri: &str) -> Result<Self, BridgeError> {
        if uri == SCHEMA_URI {
            return Ok(ResourceAddress::Schema);
        }

        uri.strip_prefix(PERSONA_URI_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(ResourceAddress::Persona)
            .ok_or_else(|| BridgeError::InvalidRequest(uri.to_string()))
    }
}

/// The persona JSON Schema, built once and shared for the process lifetime.
pub fn persona_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let string = json!({ "type": "string" });
        let number = json!({ "type": "number" });
        let integer = json!({ "type": "integer" });
        let object = json!({ "type": "object" });
        let strings = json!({ "type": "array", "items": { "type": "string" } });

        json!({
            "type": "object",
            "properties": {
                "id": integer,
                "name": string,
                "demographic": {
                    "type": "object",
                    "properties": {
                        "latitude": number,
                        "longitude": number,
                        "language": string,
                        "country": string,
                        "city": string,
                        "region": string,
                        "age": integer,
                        "gender": string,
                        "education": string,
                        "income": string,
                        "occupation": string
                    }
                },
                "psychographic": {
                    "type": "object",
                    "properties": {
                        "interests": strings,
                        "personal_values": strings,
                        "attitudes": strings,
                        "lifestyle": string,
                        "personality": string,
                        "opinions": strings
                    }
                },
                "behavioral": {
                    "type": "object",
                    "properties": {
                        "browsing_habits": strings,
                        "purchase_history": strings,
                        "brand_interactions": strings,
                        "device_usage": object,
                        "social_media_activity": object,
                        "content_consumption": object
                    }
                },
                "contextual": {
                    "type": "object",
                    "properties": {
                        "time_of_day": string,
                        "day_of_week": string,
                        "season": string,
                        "weather": string,
                        "device_type": string,
                        "browser_type": string,
                        "screen_size": string,
                        "connection_type": string
                    }
                }
            },
            "required": ["name"]
        })
    })
}

pub fn list_resources() -> ListResourcesResult {
    ListResourcesResult::new(vec![ResourceInfo {
        uri: SCHEMA_URI.to_string(),
        name: "Persona Schema".to_string(),
        description: Some("Schema definition for persona objects".to_string()),
        mime_type: Some(JSON_MIME_TYPE.to_string()),
        meta: None,
    }])
}

pub fn list_resource_templates() -> ListResourceTemplatesResult {
    ListResourceTemplatesResult::new(vec![ResourceTemplate {
        uri_template: PERSONA_URI_TEMPLATE.to_string(),
        name: "Individual persona by ID".to_string(),
        description: Some("Access a specific persona by its ID".to_string()),
        mime_type: Some(JSON_MIME_TYPE.to_string()),
    }])
}

pub async fn read_resource(api: &PersonaApi, uri: &str) -> Result<ReadResourceResult, BridgeError> {
    let value = match ResourceAddress::parse(uri)? {
        ResourceAddress::Schema => persona_schema().clone(),
        ResourceAddress::Persona(id) => api.get_persona(id).await.map_err(|e| {
            if e.is_not_found() {
                BridgeError::NotFound { id }
            } else {
                BridgeError::Internal(format!("Error fetching persona: {}", e))
            }
        })?,
    };

    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    Ok(ReadResourceResult::new(vec![Content::Resource {
        uri: uri.to_string(),
        text: Some(text),
        mime_type: Some(JSON_MIME_TYPE.to_string()),
        meta: None,
    }]))
}

/// The persona resources, served live from the API.
#[derive(Debug, Clone)]
pub struct PersonaResources {
    api: PersonaApi,
}

impl PersonaResources {
    pub fn new(api: PersonaApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceHandler for PersonaResources {
    async fn read(&self, uri: &str, extra: RequestHandlerExtra) -> pmcp::Result<ReadResourceResult> {
        tokio::select! {
            biased;
            () = extra.cancelled() => Err(pmcp::Error::cancelled()),
            result = read_resource(&self.api, uri) => {
                if let Err(ref e) = result {
                    tracing::warn!(uri, error = %e, "Resource read failed");
                }
                result.map_err(pmcp::Error::from)
            }
        }
    }

    async fn list(
        &self,
        _cursor: Option<String>,
        _extra: RequestHandlerExtra,
    ) -> pmcp::Result<ListResourcesResult> {
        Ok(list_resources())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_uri() {
        assert_eq!(
            ResourceAddress::parse("persona://schema"),
            Ok(ResourceAddress::Schema)
        );
    }

    #[test]
    fn test_parse_numeric_uri() {
        assert_eq!(
            ResourceAddress::parse("persona://42"),
            Ok(ResourceAddress::Persona(42))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_uris() {
        for uri in [
            "persona://",
            "persona://abc",
            "persona://12a",
            "persona://-3",
            "persona:// 7",
            "persona://7/demographic",
            "personas://7",
            "http://7",
            "persona://99999999999999999999999",
        ] {
            assert_eq!(
                ResourceAddress::parse(uri),
                Err(BridgeError::InvalidRequest(uri.to_string())),
                "{} should be rejected",
                uri
            );
        }
    }

    #[test]
    fn test_schema_shape() {
        let schema = persona_schema();
        assert_eq!(schema["required"], json!(["name"]));
        for group in ["demographic", "psychographic", "behavioral", "contextual"] {
            assert_eq!(schema["properties"][group]["type"], json!("object"));
        }
        assert_eq!(
            schema["properties"]["psychographic"]["properties"]["interests"]["items"]["type"],
            json!("string")
        );
    }

    #[tokio::test]
    async fn test_read_schema_contents() {
        let api = PersonaApi::new(&crate::config::ApiConfig::new("http://127.0.0.1:9")).unwrap();
        let result = read_resource(&api, SCHEMA_URI).await.unwrap();

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["contents"][0]["uri"], json!(SCHEMA_URI));
        assert_eq!(wire["contents"][0]["mimeType"], json!(JSON_MIME_TYPE));
        assert!(wire["contents"][0].get("type").is_none());
        let text = wire["contents"][0]["text"].as_str().unwrap();
        assert_eq!(&serde_json::from_str::<Value>(text).unwrap(), persona_schema());
    }

    #[test]
    fn test_listings() {
        let resources = list_resources();
        assert_eq!(resources.resources.len(), 1);
        assert_eq!(resources.resources[0].uri, SCHEMA_URI);

        let templates = list_resource_templates();
        assert_eq!(templates.resource_templates[0].uri_template, "persona://{id}");
    }
}
