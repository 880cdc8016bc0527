use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::MpesaConfig,
    data::{
        DEFAULT_DESCRIPTION, PAY_BILL_ONLINE, PaymentInitiated, PaymentRequest, StkPushAck,
        StkPushEnvelope,
    },
    error::{GatewayError, Result},
    mpesa::{canonical, token},
};

const ACCEPTED: &str = "0";

/// Sends one STK push. No retries: a failed push is reported and the caller resubmits.
#[tracing::instrument(skip_all)]
pub async fn initiate_push(
    client: &Client,
    config: &MpesaConfig,
    request: PaymentRequest,
) -> Result<PaymentInitiated> {
    // Daraja only takes whole shillings, so the check runs on the rounded value
    if !request.amount.is_finite() || request.amount.round() < 1.0 {
        return Err(GatewayError::InvalidRequest(
            "Amount must be at least 1".into(),
        ));
    }

    let phone = canonical::canonicalize_phone(&request.phone_number);

    tracing::info!(raw = %request.phone_number, %phone, amount = request.amount, "mpesa_push");

    if !canonical::is_canonical(&phone) {
        return Err(GatewayError::InvalidRequest(format!(
            "Invalid phone number: {}",
            request.phone_number
        )));
    }

    let token = token::fetch(client, config).await?;

    let envelope = build_envelope(config, phone, &request, Utc::now());

    tracing::debug!(
        envelope.amount,
        %envelope.timestamp,
        %envelope.transaction_desc,
        "stk_push_envelope"
    );

    let res = client
        .post(format!(
            "{}/mpesa/stkpush/v1/processrequest",
            config.endpoint.trim_end_matches('/')
        ))
        .bearer_auth(token.as_str())
        .json(&envelope)
        .send()
        .await?;

    tracing::debug!(stk_push_status = ?res.status());

    let payload: Value = res.json().await?;

    interpret(payload, &request)
}

fn build_envelope(
    config: &MpesaConfig,
    phone: String,
    request: &PaymentRequest,
    at: DateTime<Utc>,
) -> StkPushEnvelope {
    // Password and Timestamp must come from the same instant
    let timestamp = canonical::timestamp(at);
    let password = canonical::derive_password(&config.short_code, &config.passkey(), &timestamp);

    StkPushEnvelope {
        business_short_code: config.short_code.clone(),
        password,
        timestamp,
        transaction_type: PAY_BILL_ONLINE,
        amount: request.amount.round() as u64,
        party_a: phone.clone(),
        party_b: config.short_code.clone(),
        phone_number: phone,
        callback_url: config.callback_url.clone(),
        account_reference: config.account_reference.clone(),
        transaction_desc: request
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
    }
}

fn interpret(payload: Value, request: &PaymentRequest) -> Result<PaymentInitiated> {
    let ack = StkPushAck::read(&payload);

    if ack.response_code != Some(ACCEPTED) {
        let message = ack
            .error_message
            .or(ack.response_description)
            .unwrap_or("STK push failed")
            .to_string();

        tracing::warn!(%payload, "stk_push_rejected");

        return Err(GatewayError::rejected(message, payload));
    }

    let (Some(checkout_request_id), Some(merchant_request_id)) =
        (ack.checkout_request_id, ack.merchant_request_id)
    else {
        tracing::warn!(%payload, "stk_push_missing_ids");

        return Err(GatewayError::rejected(
            "Invalid response from M-Pesa",
            payload,
        ));
    };

    tracing::info!(checkout_request_id, merchant_request_id, "stk_push_accepted");

    let PaymentRequest {
        amount,
        phone_number,
        ..
    } = request;

    Ok(PaymentInitiated {
        success: true,
        checkout_request_id: checkout_request_id.to_string(),
        merchant_request_id: merchant_request_id.to_string(),
        message: format!(
            "STK push sent to {phone_number}. Please check your phone and enter your M-Pesa PIN."
        ),
        instructions: format!(
            "1. You will receive an M-Pesa prompt on {phone_number}\n\
             2. Enter your M-Pesa PIN\n\
             3. Confirm the payment of KES {amount}\n\
             4. You will receive a confirmation SMS"
        ),
    })
}
