//! SMS channel for docwatch, backed by the Twilio Messages API.
//!
//! ```no_run
//! use docwatch_twilio::{TwilioConfig, TwilioTransport};
//!
//! let config = TwilioConfig::new("AC123", "auth-token", "+15551234567");
//! let transport = TwilioTransport::new(config);
//! ```

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::TwilioConfig;
pub use error::TwilioError;
pub use transport::TwilioTransport;
