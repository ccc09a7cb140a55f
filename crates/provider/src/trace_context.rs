//! W3C trace-context propagation for the HTTP channels.
//!
//! Adds `traceparent`/`tracestate` to outbound requests so the messaging
//! provider's logs can be correlated with a reminder pass. Without a global
//! propagator (OpenTelemetry disabled) nothing is added.

use opentelemetry::propagation::Injector;
use opentelemetry::{Context, global};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(name) = HeaderName::from_bytes(key.as_bytes())
            && let Ok(val) = HeaderValue::from_str(&value)
        {
            self.0.insert(name, val);
        }
    }
}

/// Inject the current span's trace context into an outgoing request.
pub fn inject_trace_context(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let mut headers = HeaderMap::new();
    let cx = Context::current();
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&cx, &mut HeaderInjector(&mut headers));
    });
    if headers.is_empty() {
        builder
    } else {
        builder.headers(headers)
    }
}
