use serde::{Deserialize, Serialize};

/// Form-encoded body for `POST /Accounts/{sid}/Messages.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageForm {
    #[serde(rename = "To")]
    pub to: String,

    #[serde(rename = "From")]
    pub from: String,

    #[serde(rename = "Body")]
    pub body: String,
}

/// The subset of the message resource we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    pub sid: Option<String>,
    pub status: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}
