//! Binance authentication and request signing
//!
//! - HMAC-SHA256 over the canonical query string, lowercase hex
//! - The API key travels in the `X-MBX-APIKEY` header
//! - The secret never leaves this module except as an HMAC key

use crate::errors::{ExchangeError, Result};

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance API credentials
///
/// Both halves are trimmed on construction and must be non-empty. The secret
/// is redacted from `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret_key: SecretString,
}

impl Credentials {
    /// Create new credentials
    pub fn new(api_key: impl AsRef<str>, secret_key: impl AsRef<str>) -> Result<Self> {
        let api_key = api_key.as_ref().trim();
        let secret_key = secret_key.as_ref().trim();

        if api_key.is_empty() {
            return Err(ExchangeError::MissingCredentials("API key is empty".to_string()));
        }
        if secret_key.is_empty() {
            return Err(ExchangeError::MissingCredentials("API secret is empty".to_string()));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            secret_key: SecretString::from(secret_key.to_string()),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign `payload` with this secret
    pub fn sign(&self, payload: &str) -> Result<String> {
        sign(self.secret_key.expose_secret(), payload)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask(&self.api_key))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// HMAC-SHA256 of `message` keyed by `secret`, as lowercase hex.
pub fn sign(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::SigningError(format!("HMAC setup failed: {e}")))?;

    mac.update(message.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(hex::encode(signature))
}

/// Keep the first and last four characters of a key for log lines
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
