use crate::error::ServerError;

const ENV_PREFIX: &str = "env:";

/// Resolve a credential given inline or as an `env:VAR_NAME` reference.
pub fn resolve_secret(value: &str) -> Result<String, ServerError> {
    let Some(var) = value.trim().strip_prefix(ENV_PREFIX) else {
        return Ok(value.to_owned());
    };
    std::env::var(var).map_err(|_| {
        ServerError::Config(format!("environment variable {var} is not set"))
    })
}

/// Debug placeholder for a configured secret.
pub(crate) fn redacted(value: &str) -> &'static str {
    if value.trim().starts_with(ENV_PREFIX) {
        "[ENV]"
    } else {
        "[REDACTED]"
    }
}
