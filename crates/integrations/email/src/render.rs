//! HTML body for reminder emails.

use docwatch_core::ReminderTier;
use docwatch_provider::{ProviderError, ReminderMessage};
use minijinja::{Environment, context};

const TEMPLATE_NAME: &str = "reminder.html";

/// Evaluation budget for one render.
const FUEL_LIMIT: u64 = 50_000;

const REMINDER_HTML: &str = r#"<!DOCTYPE html>
<html>
<body style="margin:0;padding:24px;background:#f4f4f5;font-family:Arial,Helvetica,sans-serif;color:#18181b">
  <table role="presentation" width="100%" style="max-width:560px;margin:0 auto;background:#ffffff;border-radius:8px;overflow:hidden">
    <tr>
      <td style="background:{{ accent }};color:#ffffff;padding:16px 24px;font-size:14px;font-weight:bold;letter-spacing:0.05em">
        {% if critical %}CRITICAL &middot; {% endif %}{{ label }}
      </td>
    </tr>
    <tr>
      <td style="padding:24px">
        <h1 style="margin:0 0 16px;font-size:20px">{{ headline }}</h1>
        <p style="margin:0 0 16px;line-height:1.5">{{ narrative }}</p>
        <p style="margin:0 0 24px;font-size:14px;color:#52525b">Expiry date: <strong>{{ expiry }}</strong></p>
        <p style="margin:0;font-size:14px;color:#52525b">Open DocWatch to review the document and mark it renewed.</p>
      </td>
    </tr>
  </table>
</body>
</html>
"#;

/// Renders the styled HTML part of a reminder email.
#[derive(Debug)]
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, ProviderError> {
        let mut env = Environment::new();
        env.set_fuel(Some(FUEL_LIMIT));
        env.add_template(TEMPLATE_NAME, REMINDER_HTML)
            .map_err(|e| ProviderError::Serialization(format!("reminder template: {e}")))?;
        Ok(Self { env })
    }

    pub fn render(&self, message: &ReminderMessage) -> Result<String, ProviderError> {
        let tier = message.tier();
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| ProviderError::Serialization(e.to_string()))?;
        template
            .render(context! {
                accent => accent_color(tier),
                label => tier_label(tier),
                critical => message.is_critical,
                headline => message.headline(),
                narrative => message.narrative(),
                expiry => message.formatted_expiry(),
            })
            .map_err(|e| ProviderError::Serialization(format!("failed to render reminder email: {e}")))
    }
}

fn accent_color(tier: ReminderTier) -> &'static str {
    match tier {
        ReminderTier::Expired | ReminderTier::ExpiresToday => "#b91c1c",
        ReminderTier::ExpiresSoon => "#c2410c",
        ReminderTier::ExpiresWeek => "#b45309",
        ReminderTier::ExpiresTwoWeeks => "#1d4ed8",
        ReminderTier::ExpiresMonth => "#15803d",
    }
}

fn tier_label(tier: ReminderTier) -> &'static str {
    match tier {
        ReminderTier::Expired => "EXPIRED",
        ReminderTier::ExpiresToday => "EXPIRES TODAY",
        ReminderTier::ExpiresSoon => "EXPIRING SOON",
        ReminderTier::ExpiresWeek => "EXPIRES THIS WEEK",
        ReminderTier::ExpiresTwoWeeks => "EXPIRES IN TWO WEEKS",
        ReminderTier::ExpiresMonth => "RENEWAL REMINDER",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn message(days: i64) -> ReminderMessage {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        ReminderMessage::new("GST <Registration>", today + Duration::days(days), today)
    }

    #[test]
    fn renders_tier_styling_and_narrative() {
        let renderer = HtmlRenderer::new().unwrap();
        let html = renderer.render(&message(-3)).unwrap();
        assert!(html.contains("#b91c1c"));
        assert!(html.contains("EXPIRED"));
        assert!(html.contains("12 Oct 2026"));
        assert!(!html.contains("CRITICAL &middot;"));
    }

    #[test]
    fn escapes_document_title() {
        let renderer = HtmlRenderer::new().unwrap();
        let html = renderer.render(&message(20)).unwrap();
        assert!(html.contains("GST &lt;Registration&gt;"));
        assert!(html.contains("RENEWAL REMINDER"));
    }

    #[test]
    fn critical_banner() {
        let renderer = HtmlRenderer::new().unwrap();
        let html = renderer.render(&message(0).critical(true)).unwrap();
        assert!(html.contains("CRITICAL &middot; EXPIRES TODAY"));
    }
}
