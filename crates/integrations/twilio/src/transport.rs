use docwatch_core::Channel;
use docwatch_provider::{Delivery, PhoneNormalizer, ProviderError, ReminderMessage, Transport};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::TwilioConfig;
use crate::error::TwilioError;
use crate::types::{MessageResource, SendMessageForm};

/// Sends SMS reminders through the Twilio Messages API.
pub struct TwilioTransport {
    config: TwilioConfig,
    phone: PhoneNormalizer,
    client: Client,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self::with_client(config, client)
    }

    /// Create a transport sharing an existing HTTP client.
    pub fn with_client(config: TwilioConfig, client: Client) -> Self {
        let phone = PhoneNormalizer::new(config.default_country_code.clone());
        Self {
            config,
            phone,
            client,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url, self.config.account_sid
        )
    }

    fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}.json",
            self.config.api_base_url, self.config.account_sid
        )
    }

    fn check_credentials(&self) -> Result<(), TwilioError> {
        if self.config.account_sid.is_empty() {
            return Err(TwilioError::MissingCredentials("account_sid"));
        }
        if self.config.auth_token.is_empty() {
            return Err(TwilioError::MissingCredentials("auth_token"));
        }
        if self.config.from_number.is_empty() {
            return Err(TwilioError::MissingCredentials("from_number"));
        }
        Ok(())
    }

    async fn post_message(&self, form: &SendMessageForm) -> Result<MessageResource, TwilioError> {
        debug!(to = %form.to, "sending SMS via Twilio");

        let response = docwatch_provider::inject_trace_context(
            self.client
                .post(self.messages_url())
                .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
                .form(form),
        )
        .send()
        .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Twilio API rate limit hit");
            return Err(TwilioError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api(format!("HTTP {status}: {body}")));
        }

        let resource: MessageResource = response.json().await?;

        if let Some(code) = resource.error_code {
            let msg = resource
                .error_message
                .unwrap_or_else(|| format!("error code {code}"));
            return Err(TwilioError::Api(msg));
        }

        Ok(resource)
    }
}

impl Transport for TwilioTransport {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "twilio"
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }

    #[instrument(skip(self, destination, message), fields(transport = "twilio", tier = %message.tier()))]
    async fn send(
        &self,
        destination: &str,
        message: &ReminderMessage,
    ) -> Result<Delivery, ProviderError> {
        self.check_credentials()?;
        let digits = self.phone.require(destination)?;

        let form = SendMessageForm {
            to: format!("+{digits}"),
            from: self.config.from_number.clone(),
            body: message.sms_body(),
        };
        let resource = self.post_message(&form).await?;

        debug!(sid = ?resource.sid, status = ?resource.status, "Twilio accepted SMS");
        Ok(Delivery {
            message_id: resource.sid,
        })
    }

    #[instrument(skip(self), fields(transport = "twilio"))]
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.check_credentials()?;

        let response = self
            .client
            .get(self.account_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Connection(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    /// Minimal HTTP server on a random port that answers one request with a
    /// canned response and hands back the raw request text.
    struct MockServer {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockServer {
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

        async fn respond_once(self, status_code: u16, body: &str) -> String {
            let (mut stream, _) = self.listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;

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
            request
        }
    }

    /// Read headers plus a `Content-Length` body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn message() -> ReminderMessage {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        ReminderMessage::new("Visa", expiry, today)
    }

    fn config(base_url: &str) -> TwilioConfig {
        TwilioConfig::new("AC123", "token", "+15551234567").with_api_base_url(base_url)
    }

    #[tokio::test]
    async fn send_posts_normalized_number_and_sms_body() {
        let server = MockServer::start().await;
        let transport = TwilioTransport::new(config(&server.base_url));

        let handle = tokio::spawn(server.respond_once(
            201,
            r#"{"sid":"SM123","status":"queued","error_code":null,"error_message":null}"#,
        ));

        let delivery = transport
            .send("+91 88516 70050", &message())
            .await
            .expect("send should succeed");
        let request = handle.await.unwrap();

        assert_eq!(delivery.message_id.as_deref(), Some("SM123"));
        assert!(request.starts_with("POST /2010-04-01/Accounts/AC123/Messages.json"));
        assert!(request.contains("To=%2B918851670050"));
        assert!(request.contains("expires+tomorrow"));
    }

    #[tokio::test]
    async fn invalid_phone_fails_before_any_request() {
        let transport = TwilioTransport::new(config("http://127.0.0.1:1"));
        let err = transport.send("123", &message()).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDestination(_)));
    }

    #[tokio::test]
    async fn missing_credentials_fail_fast() {
        let transport = TwilioTransport::new(
            TwilioConfig::new("AC123", "", "+15551234567").with_api_base_url("http://127.0.0.1:1"),
        );
        let err = transport.send("8851670050", &message()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn rate_limited_is_retryable() {
        let server = MockServer::start().await;
        let transport = TwilioTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(429, r#"{"message":"slow down"}"#));

        let err = transport.send("8851670050", &message()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, ProviderError::RateLimited));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn error_code_in_body_is_execution_failure() {
        let server = MockServer::start().await;
        let transport = TwilioTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(
            200,
            r#"{"sid":null,"status":null,"error_code":20003,"error_message":"Authentication Error"}"#,
        ));

        let err = transport.send("8851670050", &message()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, ProviderError::ExecutionFailed(ref m) if m == "Authentication Error"));
    }

    #[tokio::test]
    async fn server_error_status_is_execution_failure() {
        let server = MockServer::start().await;
        let transport = TwilioTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(500, r#"{"message":"boom"}"#));

        let err = transport.send("8851670050", &message()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, ProviderError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn health_check_looks_up_account() {
        let server = MockServer::start().await;
        let transport = TwilioTransport::new(config(&server.base_url));
        let handle = tokio::spawn(server.respond_once(200, r#"{"sid":"AC123"}"#));

        transport.health_check().await.unwrap();
        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /2010-04-01/Accounts/AC123.json"));
    }
}
