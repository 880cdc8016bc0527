//! Wire shapes for the M-Pesa flow, inbound and outbound.

use serde_json::Value;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: f64,
    pub phone_number: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub const PAY_BILL_ONLINE: &str = "CustomerPayBillOnline";
pub const DEFAULT_DESCRIPTION: &str = "AfyaAlert Service Payment";

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushEnvelope {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: &'static str,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// Synchronous acknowledgment from the push endpoint. Daraja uses different
/// keys for accepted and rejected requests, and each key is read on its own
/// so one mistyped field does not hide the rest.
pub struct StkPushAck<'a> {
    pub response_code: Option<&'a str>,
    pub response_description: Option<&'a str>,
    pub checkout_request_id: Option<&'a str>,
    pub merchant_request_id: Option<&'a str>,
    pub error_message: Option<&'a str>,
}

impl<'a> StkPushAck<'a> {
    pub fn read(payload: &'a Value) -> Self {
        Self {
            response_code: text(payload, "ResponseCode"),
            response_description: text(payload, "ResponseDescription"),
            checkout_request_id: text(payload, "CheckoutRequestID"),
            merchant_request_id: text(payload, "MerchantRequestID"),
            error_message: text(payload, "errorMessage"),
        }
    }
}

fn text<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiated {
    pub success: bool,
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub message: String,
    pub instructions: String,
}
