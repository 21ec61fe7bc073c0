//! Telegram Bot API delivery

use crate::ReporterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default Bot API base
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram delivery configuration
///
/// Credentials are never stored in configuration, only the names of the
/// environment variables that hold them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable holding the bot token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Environment variable holding the target chat id
    #[serde(default = "default_chat_id_env")]
    pub chat_id_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_chat_id_env() -> String {
    "TELEGRAM_CHAT_ID".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
            chat_id_env: default_chat_id_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to one chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` using bot `token`
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, ReporterError> {
        Self::build(
            api_base.into(),
            token.into(),
            chat_id.into(),
            Duration::from_secs(default_timeout_secs()),
        )
    }

    /// Create a notifier from configuration, reading credentials from the environment
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Configuration` if either variable is unset or empty.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, ReporterError> {
        let token = read_env(&config.token_env)?;
        let chat_id = read_env(&config.chat_id_env)?;
        Self::build(
            config.api_base.clone(),
            token,
            chat_id,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build(
        api_base: String,
        token: String,
        chat_id: String,
        timeout: Duration,
    ) -> Result<Self, ReporterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReporterError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            chat_id,
            client,
        })
    }

    /// Send `text` as a plain message
    ///
    /// # Errors
    ///
    /// `Communication` when the API cannot be reached or answers with something
    /// other than a Bot API reply; `Delivery` when it answers `ok: false`.
    pub async fn send(&self, text: &str) -> Result<(), ReporterError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        debug!("Sending {} chars to chat {}", text.len(), self.chat_id);

        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| ReporterError::Communication(e.without_url().to_string()))?;

        let status = response.status();
        let reply: ApiReply = response.json().await.map_err(|e| {
            ReporterError::Communication(format!(
                "unreadable reply ({}): {}",
                status,
                e.without_url()
            ))
        })?;

        if !reply.ok {
            return Err(ReporterError::Delivery(
                reply
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        info!("Briefing delivered to Telegram");
        Ok(())
    }
}

fn read_env(name: &str) -> Result<String, ReporterError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ReporterError::Configuration(format!("{} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_chat_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({"chat_id": "-100", "text": "브리핑"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri(), "123:abc", "-100").unwrap();
        notifier.send("브리핑").await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_message_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri(), "t", "c").unwrap();
        let err = notifier.send("x").await.unwrap_err();
        assert!(matches!(err, ReporterError::Delivery(msg) if msg.contains("chat not found")));
    }

    #[tokio::test]
    async fn test_non_json_reply_is_communication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri(), "t", "c").unwrap();
        let err = notifier.send("x").await.unwrap_err();
        assert!(matches!(err, ReporterError::Communication(_)));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = TelegramConfig {
            token_env: "VOC_TEST_TELEGRAM_TOKEN_UNSET".to_string(),
            chat_id_env: "VOC_TEST_TELEGRAM_CHAT_UNSET".to_string(),
            ..TelegramConfig::default()
        };
        let err = TelegramNotifier::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ReporterError::Configuration(msg) if msg.contains("VOC_TEST_TELEGRAM_TOKEN_UNSET")
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: TelegramConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TelegramConfig::default());
        assert_eq!(config.token_env, "TELEGRAM_BOT_TOKEN");
    }
}
