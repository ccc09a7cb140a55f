use super::*;

#[test]
fn empty_file_yields_defaults() {
    let config = DocwatchConfig::from_toml("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.store.backend, "memory");
    assert!(config.scheduler.enabled);
    assert_eq!(config.scheduler.cron, "0 8,20 * * *");
    assert_eq!(config.scheduler.timezone, "UTC");
    assert_eq!(config.scheduler.delivery_timeout_seconds, 30);
    assert_eq!(config.scheduler.max_concurrent, 4);
    assert_eq!(config.phone.default_country_code, "91");
    assert!(!config.channels.dry_run);
    assert!(config.channels.email.is_none());
    assert!(!config.telemetry.enabled);
    assert_eq!(config.telemetry.service_name, "docwatch");
}

#[test]
fn missing_file_yields_defaults() {
    let config = DocwatchConfig::load(std::path::Path::new("/nonexistent/docwatch.toml")).unwrap();
    assert_eq!(config.server.port, 8080);
}

#[test]
fn scheduler_section_converts() {
    let config = DocwatchConfig::from_toml(
        r#"
        [scheduler]
        cron = "30 7 * * *"
        timezone = "Asia/Kolkata"
        delivery_timeout_seconds = 5
        max_concurrent = 1
        run_on_startup = true
        "#,
    )
    .unwrap();

    let orchestrator = config.scheduler.orchestrator();
    assert_eq!(orchestrator.delivery_timeout, std::time::Duration::from_secs(5));
    assert_eq!(orchestrator.max_concurrent, 1);

    let schedule = config.scheduler.schedule();
    assert_eq!(schedule.cron, "30 7 * * *");
    assert_eq!(schedule.timezone, "Asia/Kolkata");
    assert!(schedule.run_on_startup);
}

#[test]
fn email_backend_defaults_to_api_with_tls() {
    let config = DocwatchConfig::from_toml(
        r#"
        [channels.email]
        from_address = "reminders@example.com"
        api_key = "key"
        "#,
    )
    .unwrap();
    let email = config.channels.email.unwrap();
    assert_eq!(email.backend, EmailBackendKind::Api);
    assert!(email.tls);
}

#[test]
fn unknown_email_backend_is_rejected() {
    let err = DocwatchConfig::from_toml(
        r#"
        [channels.email]
        backend = "carrier-pigeon"
        from_address = "reminders@example.com"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::Config(_)));
}

#[test]
fn debug_output_hides_credentials() {
    let config = DocwatchConfig::from_toml(
        r#"
        [store]
        backend = "postgres"
        url = "postgres://docwatch:hunter2@db/docwatch"

        [channels.whatsapp]
        access_token = "EAAG-live-token"
        phone_number_id = "1234567890"

        [channels.sms]
        account_sid = "AC123"
        auth_token = "env:TWILIO_AUTH_TOKEN"
        from_number = "+15551234567"

        [channels.email]
        backend = "smtp"
        from_address = "reminders@example.com"
        smtp_host = "smtp.example.com"
        username = "mailer"
        password = "smtp-pass"
        "#,
    )
    .unwrap();

    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(!debug.contains("EAAG-live-token"));
    assert!(!debug.contains("smtp-pass"));
    assert!(debug.contains("[ENV]"));
    assert!(debug.contains("1234567890"));
}

#[test]
fn inline_secret_is_returned_as_is() {
    assert_eq!(resolve_secret("plain-value").unwrap(), "plain-value");
}

#[test]
fn env_secret_must_be_set() {
    let err = resolve_secret("env:DOCWATCH_TEST_SURELY_UNSET").unwrap_err();
    assert!(err.to_string().contains("DOCWATCH_TEST_SURELY_UNSET is not set"));
}

#[test]
fn env_secret_is_read_from_environment() {
    // PATH is present in every test environment.
    let path = std::env::var("PATH").unwrap();
    assert_eq!(resolve_secret("env:PATH").unwrap(), path);
}
