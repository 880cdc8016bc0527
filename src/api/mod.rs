mod contact;
mod mpesa;
mod paystack;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{
        HeaderName, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing,
};
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::{config::Providers, error::GatewayError};

#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub providers: Arc<Providers>,
}

impl AppState {
    pub fn new(client: Client, providers: Providers) -> Self {
        Self {
            client,
            providers: Arc::new(providers),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let trace = tower_http::trace::TraceLayer::new_for_http()
        .on_request(|request: &Request<_>, _: &tracing::Span| {
            tracing::debug!(method = ?request.method(), url = ?request.uri(), "req");
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: Duration, _: &tracing::Span| {
                tracing::debug!(status = ?response.status(), ?latency, "res");
            },
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/mpesa-payment", routing::post(mpesa::create))
        .route("/paystack-payment", routing::post(paystack::create))
        .route("/send-contact-email", routing::post(contact::send))
        .route("/health", routing::get(health))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    tracing::info!("starting API");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies get the same JSON failure shape as everything else.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> crate::error::Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))
}
