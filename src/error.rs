use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Deployment secrets missing or unusable. The operator has to fix these.
    #[error("{0}")]
    Configuration(String),

    /// The provider refused to hand out an access token.
    #[error("{0}")]
    UpstreamAuth(String),

    /// The provider answered but rejected the request at the application level.
    #[error("{message}")]
    UpstreamRequest { message: String, data: Value },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamRequest { .. } | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Configuration(_)
            | GatewayError::UpstreamAuth(_)
            | GatewayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn rejected(message: impl Into<String>, data: Value) -> Self {
        GatewayError::UpstreamRequest {
            message: message.into(),
            data,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[derive(Debug, serde::Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        tracing::warn!(%status, err = %self, "request_failed");

        let data = match &self {
            GatewayError::UpstreamRequest { data, .. } => Some(data.clone()),
            _ => None,
        };

        let body = FailureBody {
            success: false,
            error: self.to_string(),
            data,
        };

        (status, Json(body)).into_response()
    }
}
