use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::{AppState, body},
    data::{PaymentInitiated, PaymentRequest},
    error::Result,
    mpesa,
};

#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentInitiated>> {
    let request = body(payload)?;

    let initiated = mpesa::initiate_push(&state.client, &state.providers.mpesa, request).await?;

    Ok(Json(initiated))
}
