//! Push arbitrary document payloads to the Frappe server.
//!
//! The host hands over a target doctype and pre-mapped payloads; each one
//! becomes a `POST /api/resource/{doctype}` and the created names come back
//! in a notification descriptor the host can display as-is.

use serde::Serialize;
use serde_json::Value;

use crate::client::{self, HttpTransport};
use crate::config::{ConfigProvider, FrappeConnection};
use crate::error::ApiResult;

/// Payload field echoed back in the push summary.
pub const CORRELATION_FIELD: &str = "custom_odoo_ref";

/// Client-action descriptor the host turns into a UI notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: String,
    pub tag: String,
    pub params: NotificationParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationParams {
    #[serde(rename = "type")]
    pub kind: String,
    pub sticky: bool,
    pub title: String,
    pub message: String,
}

impl Notification {
    fn success(title: String, message: String) -> Self {
        Notification {
            kind: "ir.actions.client".to_string(),
            tag: "display_notification".to_string(),
            params: NotificationParams {
                kind: "success".to_string(),
                sticky: true,
                title,
                message,
            },
        }
    }
}

/// Creates one remote document per payload and reports the created names,
/// paired with each payload's [`CORRELATION_FIELD`] (or `-` when absent).
///
/// Stops at the first failure; documents created before it are kept.
///
/// # Errors
///
/// [`crate::ApiError::Configuration`] before any request, or the first
/// create failure with the server's own detail.
pub fn push<C, T>(
    config: &C,
    transport: &T,
    target_doctype: &str,
    payloads: &[Value],
) -> ApiResult<Notification>
where
    C: ConfigProvider,
    T: HttpTransport,
{
    let conn = FrappeConnection::resolve(config)?;
    let mut created = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let name = client::create_doc(&conn, transport, target_doctype, payload)?;
        let reference = payload
            .get(CORRELATION_FIELD)
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string();
        created.push((reference, name));
    }
    log::info!("pushed {} {target_doctype} document(s)", created.len());
    let message = created
        .iter()
        .map(|(reference, name)| format!("{reference} => {name}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Notification::success(
        format!("Data pushed to {}", conn.server_url),
        message,
    ))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::config::{MemoryConfig, AUTH_TOKEN_PARAM, SERVER_URL_PARAM};
    use crate::error::ApiError;
    use crate::testing::MockTransport;

    fn config() -> MemoryConfig {
        let mut config = MemoryConfig::new();
        config.set(SERVER_URL_PARAM, "https://erp.example.com");
        config.set(AUTH_TOKEN_PARAM, "s3cret");
        config
    }

    fn created(name: &str) -> serde_json::Value {
        json!({"data": {"name": name}})
    }

    #[test]
    fn summary_lists_every_pair_in_input_order() {
        let transport = MockTransport::new()
            .reply_json(created("SO-0001"))
            .reply_json(created("SO-0002"))
            .reply_json(created("SO-0003"));
        let payloads = [
            json!({"customer": "Azure Interior", "custom_odoo_ref": "C1"}),
            json!({"customer": "Deco Addict", "custom_odoo_ref": "C2"}),
            json!({"customer": "Gemini Furniture", "custom_odoo_ref": "C3"}),
        ];
        let note = push(&config(), &transport, "Sales Order", &payloads).unwrap();
        assert_eq!(note.params.message, "C1 => SO-0001, C2 => SO-0002, C3 => SO-0003");
        assert_eq!(note.params.title, "Data pushed to https://erp.example.com");
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn push_one_customer() {
        let transport = MockTransport::new().reply_json(created("CUST-0001"));
        let payloads = [json!({"name": "A", "custom_odoo_ref": "C1"})];
        let note = push(&config(), &transport, "Customer", &payloads).unwrap();
        assert_eq!(note.params.message, "C1 => CUST-0001");
        assert_eq!(
            transport.urls()[0],
            "https://erp.example.com/api/resource/Customer"
        );
    }

    #[test]
    fn payload_without_a_reference_uses_the_placeholder() {
        let transport = MockTransport::new().reply_json(created("CUST-0002"));
        let note = push(&config(), &transport, "Customer", &[json!({"name": "B"})]).unwrap();
        assert_eq!(note.params.message, "- => CUST-0002");
    }

    #[test]
    fn first_failure_aborts_the_batch() {
        let transport = MockTransport::new()
            .reply_json(created("SO-0001"))
            .reply_json(json!({"_server_messages": "[\"Customer is required\"]"}));
        let payloads = [
            json!({"custom_odoo_ref": "C1"}),
            json!({"custom_odoo_ref": "C2"}),
            json!({"custom_odoo_ref": "C3"}),
        ];
        let err = push(&config(), &transport, "Sales Order", &payloads).unwrap_err();
        assert!(matches!(&err, ApiError::Remote(msg) if msg.contains("Customer is required")));
        // The third payload was never sent.
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn missing_config_makes_no_http_calls() {
        let transport = MockTransport::new();
        let err = push(
            &MemoryConfig::new(),
            &transport,
            "Customer",
            &[json!({"name": "A"})],
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn notification_serializes_to_the_client_action_shape() {
        let transport = MockTransport::new().reply_json(created("CUST-0001"));
        let note = push(
            &config(),
            &transport,
            "Customer",
            &[json!({"custom_odoo_ref": "C1"})],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({
                "type": "ir.actions.client",
                "tag": "display_notification",
                "params": {
                    "type": "success",
                    "sticky": true,
                    "title": "Data pushed to https://erp.example.com",
                    "message": "C1 => CUST-0001",
                },
            })
        );
    }
}
