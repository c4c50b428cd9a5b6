//! Outbound messaging gateway client.
//!
//! The production gateway is a Smart SMS BD style WhatsApp HTTP API: one
//! form POST per message, authenticated by an account id and a secret that
//! come from configuration, never from source. The trait exists so the
//! dispatcher can be exercised in tests without a network.

use crate::{
    config::settings::MessagingSettings,
    errors::{Error, Result},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// A capability to deliver one message to one recipient.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Sends `message` to the normalized `recipient` phone number.
    async fn send(&self, recipient: &str, message: &str) -> Result<()>;
}

/// Response body of the messaging API.
///
/// The API reports success as HTTP 200 with a body `status` of 200; any
/// other combination is a failure whose `message` field carries the detail.
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    status: i64,
    #[serde(default)]
    message: String,
}

/// WhatsApp gateway backed by the Smart SMS BD HTTP API.
pub struct SmartSmsGateway {
    client: Client,
    settings: MessagingSettings,
}

impl SmartSmsGateway {
    /// Creates a gateway client from the messaging settings.
    #[must_use]
    pub fn new(settings: MessagingSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/send/whatsapp",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl MessageGateway for SmartSmsGateway {
    async fn send(&self, recipient: &str, message: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint())
            .form(&[
                ("secret", self.settings.api_secret.as_str()),
                ("account", self.settings.account_id.as_str()),
                ("recipient", recipient),
                ("type", "text"),
                ("message", message),
                ("priority", "1"),
            ])
            .send()
            .await
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;

        let http_status = response.status();
        if !http_status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Transport {
                message: format!("HTTP {http_status}: {detail}"),
            });
        }

        let body: GatewayResponse =
            response.json().await.map_err(|e| Error::Transport {
                message: format!("invalid gateway response: {e}"),
            })?;
        if body.status != 200 {
            return Err(Error::Transport {
                message: body.message,
            });
        }

        debug!(recipient, "message accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn settings(base_url: &str) -> MessagingSettings {
        MessagingSettings {
            api_secret: "test-secret".to_string(),
            account_id: "test-account".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn test_endpoint_construction() {
        let gateway = SmartSmsGateway::new(settings("http://smartsmsbd.com/api"));
        assert_eq!(gateway.endpoint(), "http://smartsmsbd.com/api/send/whatsapp");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let gateway = SmartSmsGateway::new(settings("http://smartsmsbd.com/api/"));
        assert_eq!(gateway.endpoint(), "http://smartsmsbd.com/api/send/whatsapp");
    }

    #[test]
    fn test_response_parsing() {
        let ok: GatewayResponse =
            serde_json::from_str(r#"{"status":200,"message":"sent","data":{"messageId":42}}"#)
                .unwrap();
        assert_eq!(ok.status, 200);

        let failed: GatewayResponse =
            serde_json::from_str(r#"{"status":401,"message":"invalid secret","data":false}"#)
                .unwrap();
        assert_eq!(failed.status, 401);
        assert_eq!(failed.message, "invalid secret");

        // A body without a message field still parses.
        let bare: GatewayResponse = serde_json::from_str(r#"{"status":200}"#).unwrap();
        assert!(bare.message.is_empty());
    }
}
