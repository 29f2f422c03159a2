//! Error types for the faucet service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Faucet request errors.
///
/// Every variant is turned into a `{ "error": ... }` JSON body at the HTTP
/// boundary, so the `Display` text is what the caller sees.
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Recaptcha token is required")]
    MissingToken,

    #[error("Recaptcha verification failed")]
    VerificationFailed,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Faucet not configured")]
    NotConfigured,

    #[error("{0}")]
    SubmissionFailed(String),

    #[error("Invalid request body")]
    InvalidRequest(String),
}

impl FaucetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FaucetError::MissingToken
            | FaucetError::VerificationFailed
            | FaucetError::InvalidAddress
            | FaucetError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FaucetError::NotConfigured | FaucetError::SubmissionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;

/// Ledger client errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account lookup failed: {0}")]
    AccountLookupFailed(String),

    #[error("{0}")]
    SubmissionFailed(String),
}

impl From<LedgerError> for FaucetError {
    fn from(err: LedgerError) -> Self {
        match err {
            // Lookups never reach the caller; they fall back to account creation.
            LedgerError::AccountLookupFailed(msg) | LedgerError::SubmissionFailed(msg) => {
                FaucetError::SubmissionFailed(msg)
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
