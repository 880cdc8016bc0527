use reqwest::Client;
use serde_json::{Map, Value, json};

use crate::{
    config::PaystackConfig,
    error::{GatewayError, Result},
};

const CURRENCY: &str = "KES";
const SOURCE: &str = "AfyaAlert Pharmacy Payment";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct InitRequest {
    pub email: String,
    /// Minor units (cents).
    pub amount: u64,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct Initialized {
    pub success: bool,
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(serde::Deserialize)]
struct InitResponse {
    #[serde(default)]
    status: bool,
    data: Option<InitData>,
}

#[derive(serde::Deserialize)]
struct InitData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

fn channels(payment_method: Option<&str>) -> Vec<&'static str> {
    match payment_method {
        Some("mobile_money") => vec!["mobile_money"],
        Some("bank_transfer") => vec!["bank"],
        _ => vec!["card", "bank", "mobile_money"],
    }
}

fn body(config: &PaystackConfig, request: &InitRequest) -> Value {
    let metadata = request.metadata.clone().unwrap_or_default();

    let mut tagged: Map<String, Value> = match serde_json::to_value(&metadata) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    tagged.insert("source".into(), SOURCE.into());

    json!({
        "email": request.email,
        "amount": request.amount,
        "currency": CURRENCY,
        "metadata": tagged,
        "callback_url": config.callback_url,
        "channels": channels(metadata.payment_method.as_deref()),
    })
}

#[tracing::instrument(skip_all)]
pub async fn initialize_transaction(
    client: &Client,
    config: &PaystackConfig,
    request: InitRequest,
) -> Result<Initialized> {
    let secret = config.secret_key()?;

    if request.email.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("Email is required".into()));
    }

    tracing::info!(email = %request.email, amount = request.amount, "paystack_init");

    let res = client
        .post(format!(
            "{}/transaction/initialize",
            config.endpoint.trim_end_matches('/')
        ))
        .bearer_auth(secret)
        .json(&body(config, &request))
        .send()
        .await?;

    let status = res.status();

    tracing::debug!(paystack_status = ?status);

    let payload: Value = res.json().await?;

    if !status.is_success() {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Failed to initialize payment")
            .to_string();

        tracing::warn!(%payload, "paystack_rejected");

        return Err(GatewayError::rejected(message, payload));
    }

    match serde_json::from_value::<InitResponse>(payload.clone()) {
        Ok(InitResponse {
            status: true,
            data: Some(data),
        }) => {
            tracing::info!(reference = %data.reference, "paystack_initialized");

            Ok(Initialized {
                success: true,
                authorization_url: data.authorization_url,
                access_code: data.access_code,
                reference: data.reference,
            })
        }
        _ => Err(GatewayError::rejected(
            "Invalid response from Paystack",
            payload,
        )),
    }
}
