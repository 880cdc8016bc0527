use reqwest::Client;
use serde_json::Value;

use crate::{
    config::EmailConfig,
    error::{GatewayError, Result},
};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub category: String,
    pub message: String,
}

#[derive(Debug, serde::Serialize)]
pub struct Submitted {
    pub success: bool,
    pub message: &'static str,
}

#[derive(serde::Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
    reply_to: &'a str,
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}

pub fn render(form: &ContactForm) -> String {
    let phone = form
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Not provided");

    let message = escape(&form.message).replace('\n', "<br>");
    let name = escape(&form.name);

    format!(
        r#"<div style="max-width: 600px; margin: 0 auto; font-family: Arial, sans-serif;">
  <h2 style="color: #2563eb; border-bottom: 2px solid #e5e7eb; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="margin: 20px 0;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {}</p>
    <p><strong>Phone:</strong> {}</p>
    <p><strong>Category:</strong> {}</p>
    <p><strong>Subject:</strong> {}</p>
  </div>
  <div style="margin: 20px 0;">
    <h3 style="color: #374151;">Message:</h3>
    <div style="background-color: #f9fafb; padding: 15px; border-radius: 8px; border-left: 4px solid #2563eb;">{message}</div>
  </div>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; font-size: 12px; color: #6b7280;">
    <p>This email was sent from the AfyaAlert contact form.</p>
    <p>Reply directly to this email to respond to {name}.</p>
  </div>
</div>"#,
        escape(&form.email),
        escape(phone),
        escape(&form.category),
        escape(&form.subject),
    )
}

#[tracing::instrument(skip_all)]
pub async fn send_contact_email(
    client: &Client,
    config: &EmailConfig,
    form: ContactForm,
) -> Result<Submitted> {
    let api_key = config.api_key()?;
    let to = config.recipients()?;

    if form.email.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("Email is required".into()));
    }

    tracing::info!(category = %form.category, subject = %form.subject, "contact_submission");

    let email = OutboundEmail {
        from: &config.from,
        to,
        subject: format!("Contact Form: {}", form.subject),
        html: render(&form),
        reply_to: &form.email,
    };

    let res = client
        .post(format!("{}/emails", config.endpoint.trim_end_matches('/')))
        .bearer_auth(api_key)
        .json(&email)
        .send()
        .await?;

    let status = res.status();

    tracing::debug!(email_status = ?status);

    if !status.is_success() {
        let payload: Value = res.json().await.unwrap_or(Value::Null);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Failed to send email")
            .to_string();

        return Err(GatewayError::rejected(message, payload));
    }

    tracing::info!("contact_email_sent");

    Ok(Submitted {
        success: true,
        message: "Contact form submitted successfully",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn form() -> ContactForm {
        ContactForm {
            name: "Jane <Doe>".into(),
            email: "jane@example.com".into(),
            phone: None,
            subject: "Stock".into(),
            category: "general".into(),
            message: "Line one\nLine two".into(),
        }
    }

    fn config(endpoint: &str) -> EmailConfig {
        EmailConfig {
            api_key: Some("re_test".into()),
            endpoint: endpoint.into(),
            from: "AfyaAlert Contact <onboarding@resend.dev>".into(),
            to: vec!["ops@example.com".into()],
        }
    }

    #[test]
    fn template_escapes_input_and_keeps_line_breaks() {
        let html = render(&form());

        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(!html.contains("<Doe>"));
        assert!(html.contains("Line one<br>Line two"));
        assert!(html.contains("<strong>Phone:</strong> Not provided"));
    }

    #[tokio::test]
    async fn sends_through_provider() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test")
            .match_body(Matcher::PartialJson(json!({
                "to": ["ops@example.com"],
                "subject": "Contact Form: Stock",
                "reply_to": "jane@example.com"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"email-1"}"#)
            .create_async()
            .await;

        let res = send_contact_email(&Client::new(), &config(&server.url()), form())
            .await
            .expect("sent");

        assert!(res.success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_rejection_is_surfaced() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/emails")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"statusCode":422,"message":"Invalid `from` field"}"#)
            .create_async()
            .await;

        let err = send_contact_email(&Client::new(), &config(&server.url()), form())
            .await
            .expect_err("rejected");

        assert_eq!(err.to_string(), "Invalid `from` field");
    }

    #[tokio::test]
    async fn missing_api_key_is_configuration_error() {
        let mut config = config("http://127.0.0.1:1");
        config.api_key = None;

        let err = send_contact_email(&Client::new(), &config, form())
            .await
            .expect_err("misconfigured");

        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[tokio::test]
    async fn missing_recipients_fail_before_sending() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = config(&server.url());
        config.to.clear();

        let err = send_contact_email(&Client::new(), &config, form())
            .await
            .expect_err("no recipients");

        assert!(matches!(err, GatewayError::Configuration(_)));
        assert_eq!(err.to_string(), "Contact recipient not configured");
        mock.assert_async().await;
    }
}
