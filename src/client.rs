//! Thin wrapper over the Frappe resource endpoints.
//!
//! One function per REST operation, each taking the resolved connection and
//! the transport explicitly. Every JSON response is unwrapped through
//! [`FrappeEnvelope`]; the PDF fetch is the only raw one. No retries — a
//! single failed request aborts the caller.

use std::io::Cursor;

use serde::Deserialize;
use serde_json::Value;
use ureq::{
    http::{Method, Request},
    Agent, SendBody,
};
use urlencoding::encode;

use crate::config::FrappeConnection;
use crate::error::{ApiError, ApiResult};

/// Seam between the document client and the wire. Production code goes
/// through [`UreqTransport`]; tests substitute a recording fake.
pub trait HttpTransport {
    /// Issues one blocking request and returns the response body.
    ///
    /// # Errors
    ///
    /// Fails on connection-level problems only; HTTP error statuses still
    /// yield their body, since Frappe reports failures inside it.
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> ApiResult<Vec<u8>>;
}

/// Blocking transport backed by a [`ureq::Agent`].
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new() -> Self {
        // Non-2xx bodies must stay readable, error handling is JSON-level.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> ApiResult<Vec<u8>> {
        let mut request = Request::builder().method(method.clone()).uri(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = match body {
            Some(body) => {
                let json_bytes = serde_json::to_vec(body)?;
                request.body(SendBody::from_owned_reader(Cursor::new(json_bytes)))
            }
            None => request.body(SendBody::none()),
        }?;
        log::debug!("{method} {url}");
        let response = self.agent.run(request)?;
        Ok(response.into_body().read_to_vec()?)
    }
}

/// Header set sent with every request.
pub(crate) fn auth_headers(conn: &FrappeConnection, json_body: bool) -> Vec<(String, String)> {
    let mut headers = vec![
        (
            "Authorization".to_string(),
            format!("token {}", conn.auth_token),
        ),
        ("Accept".to_string(), "application/json".to_string()),
    ];
    if json_body {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

pub(crate) fn resource_url(server_url: &str, doctype: &str) -> String {
    format!("{server_url}/api/resource/{}", encode(doctype))
}

/// Envelope Frappe wraps every JSON response body in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FrappeEnvelope {
    pub data: Option<Value>,
    pub exception: Option<Value>,
    #[serde(rename = "_server_messages")]
    pub server_messages: Option<Value>,
}

impl FrappeEnvelope {
    fn parse(bytes: &[u8]) -> ApiResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Server-supplied failure detail, most specific source first.
    fn error_detail(&self) -> String {
        self.server_messages
            .as_ref()
            .or(self.exception.as_ref())
            .map_or_else(|| "response carried no data".to_string(), display_value)
    }

    pub fn into_data(mut self) -> ApiResult<Value> {
        if self.exception.is_none() {
            if let Some(data) = self.data.take() {
                return Ok(data);
            }
        }
        Err(ApiError::Remote(self.error_detail()))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Creates a document in the doctype collection and returns the name the
/// server assigned to it.
pub fn create_doc<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    doctype: &str,
    payload: &Value,
) -> ApiResult<String> {
    let url = resource_url(&conn.server_url, doctype);
    let bytes = transport.execute(Method::POST, &url, &auth_headers(conn, true), Some(payload))?;
    let data = FrappeEnvelope::parse(&bytes)?.into_data()?;
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Remote("created document has no name".to_string()))?
        .to_string();
    log::info!("created {doctype} {name}");
    Ok(name)
}

/// Deletes one document by name.
pub fn delete_doc<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    doctype: &str,
    name: &str,
) -> ApiResult<()> {
    let url = format!("{}/{}", resource_url(&conn.server_url, doctype), encode(name));
    let bytes = transport.execute(Method::DELETE, &url, &auth_headers(conn, false), None)?;
    let envelope = FrappeEnvelope::parse(&bytes)?;
    if let Some(exception) = &envelope.exception {
        return Err(ApiError::Remote(display_value(exception)));
    }
    log::info!("deleted {doctype} {name}");
    Ok(())
}

/// Reads documents from a collection, selecting `fields` and filtering with
/// the list-API triples `(doctype, field, operator, value)`.
pub fn list_docs<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    doctype: &str,
    fields: &[&str],
    filters: &[(&str, &str, &str, &str)],
) -> ApiResult<Value> {
    let fields_json = serde_json::to_string(fields)?;
    let filters_json = serde_json::to_string(
        &filters
            .iter()
            .map(|(doctype, field, operator, value)| vec![*doctype, *field, *operator, *value])
            .collect::<Vec<_>>(),
    )?;
    let url = format!(
        "{}?fields={}&filters={}",
        resource_url(&conn.server_url, doctype),
        encode(&fields_json),
        encode(&filters_json),
    );
    let bytes = transport.execute(Method::GET, &url, &auth_headers(conn, false), None)?;
    FrappeEnvelope::parse(&bytes)?.into_data()
}

/// Fetches a prepared URL and returns the raw body, no JSON decoding.
pub fn fetch_raw<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    url: &str,
) -> ApiResult<Vec<u8>> {
    transport.execute(Method::GET, url, &auth_headers(conn, false), None)
}
