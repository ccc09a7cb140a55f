//! Notification transport contract for docwatch.
//!
//! A [`Transport`] delivers one [`ReminderMessage`] through one channel.
//! Concrete transports live in the integration crates; this crate holds the
//! trait, the channel registry, the shared message copy, and phone
//! normalization.

pub mod error;
pub mod health;
pub mod log;
pub mod message;
pub mod phone;
pub mod registry;
pub mod transport;

pub use error::ProviderError;
pub use health::{HealthStatus, check_all};
pub use log::LogTransport;
pub use message::{MessageKey, ReminderMessage};
pub use phone::{DEFAULT_COUNTRY_CODE, PhoneNormalizer};
pub use registry::TransportRegistry;
pub use transport::{Delivery, DynTransport, Transport};

#[cfg(feature = "trace-context")]
pub mod trace_context;
#[cfg(feature = "trace-context")]
pub use trace_context::inject_trace_context;
