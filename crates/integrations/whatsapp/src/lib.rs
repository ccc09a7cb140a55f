//! Chat-message channel for docwatch, backed by the WhatsApp Cloud API.

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::WhatsAppConfig;
pub use error::WhatsAppError;
pub use transport::WhatsAppTransport;
