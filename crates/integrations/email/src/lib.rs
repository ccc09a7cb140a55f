pub mod api;
pub mod backend;
pub mod config;
pub mod render;
pub mod smtp;
pub mod transport;

pub use api::ApiBackend;
pub use backend::{EmailBackend, EmailMessage, EmailResult};
pub use config::{ApiConfig, EmailConfig, SmtpConfig};
pub use render::HtmlRenderer;
pub use smtp::SmtpBackend;
pub use transport::EmailTransport;
