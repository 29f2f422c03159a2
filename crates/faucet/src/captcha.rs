//! reCAPTCHA verification client

use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use tracing::{debug, warn};

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Human verification check
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Returns `true` only when the provider accepts `token`. Never fails.
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> bool;
}

/// `siteverify` response body
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA `siteverify` client
pub struct RecaptchaVerifier {
    secret: Option<String>,
    verify_url: String,
    client: reqwest::Client,
}

impl RecaptchaVerifier {
    pub fn new(secret: Option<String>, verify_url: String) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            verify_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

#[async_trait]
impl Verifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            warn!("reCAPTCHA secret key is not configured");
            return false;
        };
        if token.is_empty() {
            return false;
        }

        let mut form = vec![("secret", secret.to_string()), ("response", token.to_string())];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let response = match self.client.post(&self.verify_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("reCAPTCHA verification error: {}", e);
                return false;
            }
        };

        let body: SiteVerifyResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("reCAPTCHA returned an unreadable response: {}", e);
                return false;
            }
        };

        if !body.success {
            warn!("reCAPTCHA verification failed: {:?}", body.error_codes);
            return false;
        }

        debug!("reCAPTCHA token accepted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_secret_fails_closed() {
        let verifier = RecaptchaVerifier::new(None, DEFAULT_VERIFY_URL.to_string());
        assert!(!verifier.is_configured());
        assert!(!verifier.verify("token", None).await);

        let verifier = RecaptchaVerifier::new(Some(String::new()), DEFAULT_VERIFY_URL.to_string());
        assert!(!verifier.is_configured());
    }

    #[tokio::test]
    async fn test_empty_token_fails_closed() {
        let verifier =
            RecaptchaVerifier::new(Some("secret".into()), "http://127.0.0.1:9".to_string());
        assert!(!verifier.verify("", None).await);
    }

    #[tokio::test]
    async fn test_network_error_fails_closed() {
        let verifier =
            RecaptchaVerifier::new(Some("secret".into()), "http://127.0.0.1:9".to_string());
        assert!(!verifier.verify("token", None).await);
    }

    #[test]
    fn test_parse_provider_response() {
        let body: SiteVerifyResponse = serde_json::from_str(
            r#"{"success": false, "error-codes": ["timeout-or-duplicate"]}"#,
        )
        .unwrap();
        assert!(!body.success);
        assert_eq!(body.error_codes, vec!["timeout-or-duplicate".to_string()]);

        let body: SiteVerifyResponse =
            serde_json::from_str(r#"{"success": true, "hostname": "localhost"}"#).unwrap();
        assert!(body.success);
        assert!(body.error_codes.is_empty());
    }
}
