use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::{AppState, body},
    contact::{self, ContactForm, Submitted},
    error::Result,
};

#[tracing::instrument(skip_all)]
pub async fn send(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<Submitted>> {
    let form = body(payload)?;

    let submitted = contact::send_contact_email(&state.client, &state.providers.email, form).await?;

    Ok(Json(submitted))
}
