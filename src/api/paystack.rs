use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::{AppState, body},
    error::Result,
    paystack::{self, InitRequest, Initialized},
};

#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InitRequest>, JsonRejection>,
) -> Result<Json<Initialized>> {
    let request = body(payload)?;

    let initialized =
        paystack::initialize_transaction(&state.client, &state.providers.paystack, request).await?;

    Ok(Json(initialized))
}
