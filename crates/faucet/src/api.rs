//! HTTP API for faucet service

use super::error::FaucetError;
use super::service::{DisburseRequest, FaucetService, FaucetStatus, DISBURSE_AMOUNT};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Standalone verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Verification endpoint reply
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: text.to_string(),
        }),
    )
        .into_response()
}

/// Build the faucet router
pub fn router(service: Arc<FaucetService>, cors_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/faucet", post(faucet_handler))
        .route(
            "/api/recaptcha",
            post(recaptcha_handler).fallback(post_only_handler),
        )
        .with_state(service)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app.layer(cors);
    }

    app
}

/// Faucet disbursement handler
pub async fn faucet_handler(
    State(service): State<Arc<FaucetService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<DisburseRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected faucet request body: {}", rejection.body_text());
            return FaucetError::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    let remote_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());
    info!("Faucet request for address={}", request.address);

    match service.disburse(&request, remote_ip).await {
        Ok(disbursement) => Json(disbursement).into_response(),
        Err(e) => {
            info!("Faucet request for {} refused: {}", request.address, e);
            e.into_response()
        }
    }
}

/// Standalone reCAPTCHA check
pub async fn recaptcha_handler(
    State(service): State<Arc<FaucetService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            error!("Unreadable verification request: {}", rejection.body_text());
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let Some(token) = request.token.filter(|t| !t.is_empty()) else {
        return message(StatusCode::METHOD_NOT_ALLOWED, "Token not found");
    };

    let remote_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());
    if service.verify_token(&token, remote_ip).await {
        message(StatusCode::OK, "Success")
    } else {
        message(StatusCode::METHOD_NOT_ALLOWED, "Failed to verify")
    }
}

async fn post_only_handler() -> Response {
    message(StatusCode::METHOD_NOT_ALLOWED, "Only POST requests allowed")
}

/// Status handler
pub async fn status_handler(State(service): State<Arc<FaucetService>>) -> Json<FaucetStatus> {
    Json(service.status())
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Root handler with info
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "SPL Token Faucet",
        "version": env!("CARGO_PKG_VERSION"),
        "amount": DISBURSE_AMOUNT,
        "endpoints": {
            "POST /api/faucet": "Request tokens",
            "POST /api/recaptcha": "Check a reCAPTCHA token",
            "GET /api/status": "Get faucet status",
            "GET /health": "Health check"
        }
    }))
}
