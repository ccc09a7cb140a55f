use serde::{Deserialize, Serialize};

/// JSON body for `POST /{version}/{phone_number_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct TextMessageRequest {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub preview_url: bool,
    pub body: String,
}

impl TextMessageRequest {
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: to.into(),
            kind: "text",
            text: TextBody {
                preview_url: false,
                body: body.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: GraphError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_shape() {
        let req = TextMessageRequest::text("918851670050", "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messaging_product"], "whatsapp");
        assert_eq!(json["type"], "text");
        assert_eq!(json["to"], "918851670050");
        assert_eq!(json["text"]["body"], "hello");
    }

    #[test]
    fn error_envelope_parses() {
        let body = r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#;
        let env: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.code, Some(190));
    }
}
