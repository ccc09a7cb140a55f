use docwatch_core::Channel;
use docwatch_provider::{Delivery, PhoneNormalizer, ProviderError, ReminderMessage, Transport};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::WhatsAppConfig;
use crate::error::WhatsAppError;
use crate::types::{ErrorEnvelope, SendMessageResponse, TextMessageRequest};

/// Sends chat-message reminders through the WhatsApp Cloud API.
pub struct WhatsAppTransport {
    config: WhatsAppConfig,
    phone: PhoneNormalizer,
    client: Client,
}

impl WhatsAppTransport {
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self::with_client(config, client)
    }

    pub fn with_client(config: WhatsAppConfig, client: Client) -> Self {
        let phone = PhoneNormalizer::new(config.default_country_code.clone());
        Self {
            config,
            phone,
            client,
        }
    }

    fn phone_number_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_base_url, self.config.api_version, self.config.phone_number_id
        )
    }

    fn check_credentials(&self) -> Result<(), WhatsAppError> {
        if self.config.access_token.is_empty() {
            return Err(WhatsAppError::MissingCredentials("access_token"));
        }
        if self.config.phone_number_id.is_empty() {
            return Err(WhatsAppError::MissingCredentials("phone_number_id"));
        }
        Ok(())
    }

    async fn post_message(
        &self,
        request: &TextMessageRequest,
    ) -> Result<SendMessageResponse, WhatsAppError> {
        let url = format!("{}/messages", self.phone_number_url());
        debug!(to = %request.to, "sending WhatsApp message");

        let response = docwatch_provider::inject_trace_context(
            self.client
                .post(&url)
                .bearer_auth(&self.config.access_token)
                .json(request),
        )
        .send()
        .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("WhatsApp API rate limit hit");
            return Err(WhatsAppError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map_or(body, |env| env.error.message);
            return Err(WhatsAppError::Api(format!("HTTP {status}: {detail}")));
        }

        Ok(response.json().await?)
    }
}

impl Transport for WhatsAppTransport {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }

    #[instrument(skip(self, destination, message), fields(transport = "whatsapp", tier = %message.tier()))]
    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        self.check_credentials()?;
        let to = self.phone.require(destination)?;

        let request = TextMessageRequest::text(to, message.chat_body());
        let response = self.post_message(&request).await?;

        let message_id = response.messages.into_iter().next().map(|m| m.id);
        debug!(?message_id, "WhatsApp accepted message");
        Ok(Delivery { message_id })
    }

    #[instrument(skip(self), fields(transport = "whatsapp"))]
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.check_credentials()?;

        let response = self
            .client
            .get(self.phone_number_url())
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Connection(format!(
                "phone number lookup returned HTTP {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    struct MockGraphServer {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockGraphServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            Self {
                listener,
                base_url: format!("http://127.0.0.1:{port}"),
            }
        }

        /// Answer one request and return what the client sent.
        async fn respond_once(self, status_code: u16, body: &str) -> String {
            let (mut stream, _) = self.listener.accept().await.unwrap();

            let mut data = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
                if request_complete(&data) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&data).into_owned()
        }
    }

    fn request_complete(data: &[u8]) -> bool {
        let text = String::from_utf8_lossy(data);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        data.len() >= header_end + 4 + content_length
    }

    fn message(days: i64) -> ReminderMessage {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        ReminderMessage::new("Fire Safety Certificate", today + chrono::Duration::days(days), today)
    }

    fn config(base_url: &str) -> WhatsAppConfig {
        WhatsAppConfig::new("token", "10987654321").with_api_base_url(base_url)
    }

    #[tokio::test]
    async fn send_posts_text_message() {
        let server = MockGraphServer::start().await;
        let transport = WhatsAppTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(
            200,
            r#"{"messaging_product":"whatsapp","contacts":[{"input":"918851670050","wa_id":"918851670050"}],"messages":[{"id":"wamid.HBgM"}]}"#,
        ));

        let delivery = transport.send("8851670050", &message(-3)).await.unwrap();
        let request = handle.await.unwrap();

        assert_eq!(delivery.message_id.as_deref(), Some("wamid.HBgM"));
        assert!(request.starts_with("POST /v18.0/10987654321/messages"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer token"));
        assert!(request.contains(r#""to":"918851670050""#));
        assert!(request.contains("Document expired"));
    }

    #[tokio::test]
    async fn rejected_phone_never_reaches_api() {
        let transport = WhatsAppTransport::new(config("http://127.0.0.1:1"));
        let err = transport.send("123", &message(7)).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDestination(_)));
    }

    #[tokio::test]
    async fn missing_token_is_not_configured() {
        let transport =
            WhatsAppTransport::new(WhatsAppConfig::new("", "10987654321").with_api_base_url("http://127.0.0.1:1"));
        let err = transport.send("8851670050", &message(7)).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockGraphServer::start().await;
        let transport = WhatsAppTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(
            401,
            r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#,
        ));

        let err = transport.send("8851670050", &message(1)).await.unwrap_err();
        handle.await.unwrap();

        match err {
            ProviderError::ExecutionFailed(msg) => {
                assert!(msg.contains("Invalid OAuth access token."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_is_retryable() {
        let server = MockGraphServer::start().await;
        let transport = WhatsAppTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(429, "{}"));

        let err = transport.send("8851670050", &message(1)).await.unwrap_err();
        handle.await.unwrap();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn health_check_fetches_phone_number() {
        let server = MockGraphServer::start().await;
        let transport = WhatsAppTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(200, r#"{"id":"10987654321"}"#));

        transport.health_check().await.unwrap();
        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /v18.0/10987654321 "));
    }
}
