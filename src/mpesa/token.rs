use reqwest::Client;

use crate::{
    config::MpesaConfig,
    error::{GatewayError, Result},
};

/// Short-lived Daraja bearer token. Fetched fresh for every push.
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[tracing::instrument(skip_all)]
pub async fn fetch(client: &Client, config: &MpesaConfig) -> Result<AccessToken> {
    let (key, secret) = config.credentials()?;

    let res = client
        .get(format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            config.endpoint.trim_end_matches('/')
        ))
        .basic_auth(key, Some(secret))
        .send()
        .await?;

    let status = res.status();

    tracing::debug!(mpesa_oauth_status = ?status);

    if !status.is_success() {
        return Err(GatewayError::UpstreamAuth(
            "Failed to get M-Pesa access token".into(),
        ));
    }

    let token: TokenResponse = res.json().await.map_err(|err| {
        tracing::warn!(?err, "mpesa_oauth_body");
        GatewayError::UpstreamAuth("Malformed M-Pesa access token response".into())
    })?;

    if token.access_token.is_empty() {
        return Err(GatewayError::UpstreamAuth(
            "M-Pesa returned an empty access token".into(),
        ));
    }

    tracing::info!("mpesa_token_obtained");

    Ok(AccessToken(token.access_token))
}
