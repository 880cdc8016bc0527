use crate::error::{GatewayError, Result};

/// Safaricom's public test paybill.
pub const SANDBOX_SHORT_CODE: &str = "174379";
/// Published passkey for the sandbox paybill. Only ever used through [`Passkey::Sandbox`].
const SANDBOX_PASSKEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919";
const MIN_PASSKEY_LEN: usize = 40;

/// Provider settings, parsed once at startup and shared with every handler.
#[derive(Debug, Clone, clap::Args)]
pub struct Providers {
    #[command(flatten)]
    pub mpesa: MpesaConfig,
    #[command(flatten)]
    pub paystack: PaystackConfig,
    #[command(flatten)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, clap::Args)]
pub struct MpesaConfig {
    #[arg(long = "mpesa-consumer-key", env = "MPESA_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    #[arg(long = "mpesa-consumer-secret", env = "MPESA_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    #[arg(long = "mpesa-passkey", env = "MPESA_PASSKEY", hide_env_values = true)]
    pub passkey: Option<String>,

    #[arg(long = "mpesa-short-code", env = "MPESA_SHORT_CODE", default_value = SANDBOX_SHORT_CODE)]
    pub short_code: String,

    /// Daraja base URL, sandbox or https://api.safaricom.co.ke
    #[arg(
        id = "mpesa_endpoint",
        long = "mpesa-endpoint",
        env = "MPESA_ENDPOINT",
        default_value = "https://sandbox.safaricom.co.ke"
    )]
    pub endpoint: String,

    #[arg(
        id = "mpesa_callback_url",
        long = "mpesa-callback-url",
        env = "MPESA_CALLBACK_URL",
        default_value = "https://your-callback-url.com/callback"
    )]
    pub callback_url: String,

    #[arg(
        long = "mpesa-account-reference",
        env = "MPESA_ACCOUNT_REFERENCE",
        default_value = "AfyaAlert"
    )]
    pub account_reference: String,
}

impl MpesaConfig {
    /// Consumer key and secret, or a configuration error if either is missing or blank.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let key = non_empty(self.consumer_key.as_deref());
        let secret = non_empty(self.consumer_secret.as_deref());

        match (key, secret) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(GatewayError::Configuration(
                "M-Pesa credentials not configured".into(),
            )),
        }
    }

    pub fn passkey(&self) -> Passkey {
        Passkey::resolve(&self.short_code, self.passkey.as_deref())
    }
}

/// The passkey used to sign STK push requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Passkey {
    Live(String),
    /// Test mode: the sandbox paybill with its published passkey.
    Sandbox,
}

impl Passkey {
    pub fn resolve(short_code: &str, configured: Option<&str>) -> Self {
        let configured = configured.map(str::trim).unwrap_or_default();

        if short_code == SANDBOX_SHORT_CODE && configured.len() < MIN_PASSKEY_LEN {
            tracing::warn!("mpesa passkey looks invalid for sandbox, using sandbox test passkey");
            return Passkey::Sandbox;
        }

        Passkey::Live(configured.to_string())
    }

    pub fn secret(&self) -> &str {
        match self {
            Passkey::Live(key) => key,
            Passkey::Sandbox => SANDBOX_PASSKEY,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct PaystackConfig {
    #[arg(long = "paystack-secret-key", env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(
        id = "paystack_endpoint",
        long = "paystack-endpoint",
        env = "PAYSTACK_ENDPOINT",
        default_value = "https://api.paystack.co"
    )]
    pub endpoint: String,

    #[arg(
        id = "paystack_callback_url",
        long = "paystack-callback-url",
        env = "PAYSTACK_CALLBACK_URL",
        default_value = "https://afyaalert.com/payment-success"
    )]
    pub callback_url: String,
}

impl PaystackConfig {
    pub fn secret_key(&self) -> Result<&str> {
        non_empty(self.secret_key.as_deref())
            .ok_or_else(|| GatewayError::Configuration("Paystack secret key not configured".into()))
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct EmailConfig {
    #[arg(long = "resend-api-key", env = "RESEND_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(
        id = "resend_endpoint",
        long = "resend-endpoint",
        env = "RESEND_ENDPOINT",
        default_value = "https://api.resend.com"
    )]
    pub endpoint: String,

    #[arg(
        long = "contact-from",
        env = "CONTACT_FROM",
        default_value = "AfyaAlert Contact <onboarding@resend.dev>"
    )]
    pub from: String,

    /// Inboxes receiving contact form submissions, comma separated.
    #[arg(long = "contact-to", env = "CONTACT_TO", value_delimiter = ',')]
    pub to: Vec<String>,
}

impl EmailConfig {
    pub fn api_key(&self) -> Result<&str> {
        non_empty(self.api_key.as_deref())
            .ok_or_else(|| GatewayError::Configuration("Email API key not configured".into()))
    }

    pub fn recipients(&self) -> Result<Vec<&str>> {
        let to: Vec<&str> = self
            .to
            .iter()
            .filter_map(|r| non_empty(Some(r.as_str())))
            .collect();

        if to.is_empty() {
            return Err(GatewayError::Configuration(
                "Contact recipient not configured".into(),
            ));
        }

        Ok(to)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn mpesa(endpoint: &str) -> MpesaConfig {
        MpesaConfig {
            consumer_key: Some("key".into()),
            consumer_secret: Some("secret".into()),
            passkey: None,
            short_code: SANDBOX_SHORT_CODE.into(),
            endpoint: endpoint.into(),
            callback_url: "https://example.com/callback".into(),
            account_reference: "AfyaAlert".into(),
        }
    }

    #[test]
    fn blank_credentials_are_a_configuration_error() {
        let mut config = mpesa("http://localhost");
        config.consumer_secret = Some("   ".into());

        assert!(matches!(
            config.credentials(),
            Err(GatewayError::Configuration(_))
        ));

        config.consumer_secret = None;
        config.consumer_key = None;
        assert!(config.credentials().is_err());
    }

    #[test]
    fn sandbox_short_code_falls_back_to_test_passkey() {
        assert_eq!(Passkey::resolve(SANDBOX_SHORT_CODE, None), Passkey::Sandbox);
        assert_eq!(
            Passkey::resolve(SANDBOX_SHORT_CODE, Some("too-short")),
            Passkey::Sandbox
        );
        assert_eq!(Passkey::Sandbox.secret(), SANDBOX_PASSKEY);
    }

    #[test]
    fn production_short_code_never_inherits_sandbox_passkey() {
        assert_eq!(
            Passkey::resolve("600000", Some("short")),
            Passkey::Live("short".into())
        );
        assert_eq!(Passkey::resolve("600000", None), Passkey::Live(String::new()));

        let long = "x".repeat(MIN_PASSKEY_LEN);
        assert_eq!(
            Passkey::resolve(SANDBOX_SHORT_CODE, Some(&long)),
            Passkey::Live(long.clone())
        );
    }

    #[test]
    fn email_recipients_skip_blanks() {
        let config = EmailConfig {
            api_key: Some("re_123".into()),
            endpoint: "http://localhost".into(),
            from: "from@example.com".into(),
            to: vec![" ".into(), "ops@example.com".into()],
        };

        assert_eq!(config.recipients().expect("recipients"), vec!["ops@example.com"]);
    }
}
