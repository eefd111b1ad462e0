use std::time::Duration;

use cachegraph_core::{IntrospectionConfig, IntrospectionSchema};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{IntrospectionError, Result};
use crate::query::{INTROSPECTION_QUERY, TYPENAME_QUERY};

/// Reachability of a GraphQL endpoint, reported instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub ok: bool,
    pub message: String,
}

pub struct IntrospectionClient {
    config: IntrospectionConfig,
    client: Client,
}

impl IntrospectionClient {
    pub fn new(config: IntrospectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(build_headers(&config)?)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &IntrospectionConfig {
        &self.config
    }

    /// Run the introspection query against `endpoint`.
    ///
    /// Returns [`IntrospectionError::Cancelled`] as soon as `cancel` fires,
    /// even if the request is still in flight.
    pub async fn fetch_schema(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<IntrospectionSchema> {
        info!("Introspecting GraphQL schema at {}", endpoint);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Introspection of {} cancelled", endpoint);
                Err(IntrospectionError::Cancelled)
            }
            result = self.request_schema(endpoint) => result,
        }
    }

    /// Send `{ __typename }` and report whether a GraphQL answer came back.
    pub async fn check_endpoint(&self, endpoint: &str) -> EndpointStatus {
        match self.post(endpoint, json!({ "query": TYPENAME_QUERY })).await {
            Ok(body) if body.get("data").is_some() => EndpointStatus {
                ok: true,
                message: format!("{} is reachable", endpoint),
            },
            Ok(_) => EndpointStatus {
                ok: false,
                message: format!("{} did not return a GraphQL response", endpoint),
            },
            Err(e) => EndpointStatus {
                ok: false,
                message: e.to_string(),
            },
        }
    }

    async fn request_schema(&self, endpoint: &str) -> Result<IntrospectionSchema> {
        let body = self
            .post(
                endpoint,
                json!({
                    "query": INTROSPECTION_QUERY,
                    "operationName": "IntrospectionQuery",
                }),
            )
            .await?;

        let schema = parse_introspection_response(body)?;
        debug!(
            types = schema.types.len(),
            "Received introspection result from {}", endpoint
        );
        Ok(schema)
    }

    async fn post(&self, endpoint: &str, payload: Value) -> Result<Value> {
        let response = self
            .client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IntrospectionError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.classify(endpoint, e))
    }

    fn classify(&self, endpoint: &str, error: reqwest::Error) -> IntrospectionError {
        if error.is_timeout() {
            IntrospectionError::Timeout {
                endpoint: endpoint.to_string(),
                seconds: self.config.timeout_secs,
            }
        } else {
            IntrospectionError::Http(error)
        }
    }
}

fn build_headers(config: &IntrospectionConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| IntrospectionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| IntrospectionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Extract `data.__schema` from a GraphQL response body.
///
/// A response without a schema is reported through its `errors` array when
/// there is one.
pub fn parse_introspection_response(body: Value) -> Result<IntrospectionSchema> {
    let schema = body
        .get("data")
        .and_then(|data| data.get("__schema"))
        .filter(|schema| !schema.is_null());

    if let Some(schema) = schema {
        return Ok(serde_json::from_value(schema.clone())?);
    }

    let messages: Vec<String> = body
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        Err(IntrospectionError::MissingSchema)
    } else {
        Err(IntrospectionError::GraphQL(messages.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let body = json!({
            "data": {
                "__schema": {
                    "queryType": { "name": "Query" },
                    "mutationType": null,
                    "subscriptionType": null,
                    "types": [{
                        "kind": "OBJECT",
                        "name": "Query",
                        "fields": [{
                            "name": "hello",
                            "args": [],
                            "type": { "kind": "SCALAR", "name": "String", "ofType": null }
                        }]
                    }]
                }
            }
        });

        let schema = parse_introspection_response(body).unwrap();
        assert_eq!(schema.query_type.unwrap().name, "Query");
        assert_eq!(schema.types.len(), 1);
    }

    #[test]
    fn test_graphql_errors_are_surfaced() {
        let body = json!({
            "data": null,
            "errors": [
                { "message": "introspection is disabled" },
                { "message": "try again" }
            ]
        });

        match parse_introspection_response(body) {
            Err(IntrospectionError::GraphQL(msg)) => {
                assert_eq!(msg, "introspection is disabled; try again")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_schema() {
        assert!(matches!(
            parse_introspection_response(json!({ "data": {} })),
            Err(IntrospectionError::MissingSchema)
        ));
        assert!(matches!(
            parse_introspection_response(json!({ "data": { "__schema": null } })),
            Err(IntrospectionError::MissingSchema)
        ));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let body = json!({ "data": { "__schema": { "types": "nope" } } });
        assert!(matches!(
            parse_introspection_response(body),
            Err(IntrospectionError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = IntrospectionConfig::default();
        config
            .headers
            .insert("Bad Header".to_string(), "value".to_string());
        assert!(matches!(
            IntrospectionClient::new(config),
            Err(IntrospectionError::InvalidHeader { .. })
        ));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_short_circuits() {
        let client = IntrospectionClient::new(IntrospectionConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client
            .fetch_schema("http://127.0.0.1:9/graphql", &token)
            .await;
        assert!(matches!(result, Err(IntrospectionError::Cancelled)));
    }
}
