//! Trial credential handling.
//!
//! The public TTS product page embeds a short-lived bearer credential in a
//! script variable (`token: "<value>"`). The credential is a JWT whose middle
//! segment carries the service `region` and the `exp` epoch second.

use std::sync::OnceLock;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SpeakError};

pub const DEFAULT_TRIAL_URL: &str =
    "https://azure.microsoft.com/en-us/services/cognitive-services/text-to-speech/";

/// Seconds subtracted from `exp` before a token counts as usable.
pub const DEFAULT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct Claims {
    region: String,
    exp: serde_json::Number,
}

/// A decoded trial credential. Replaced wholesale on renewal, never patched.
#[derive(Debug, Clone)]
pub struct Token {
    credential: SecretString,
    region: String,
    expires: i64,
}

impl Token {
    /// Decode a raw credential string into a token.
    pub fn from_credential(credential: impl Into<String>) -> Result<Self> {
        let credential = credential.into();
        let (region, expires) = {
            let segments: Vec<&str> = credential.split('.').collect();
            let [_, payload, _] = segments.as_slice() else {
                return Err(SpeakError::TokenDecode(format!(
                    "expected 3 dot-separated segments, found {}",
                    segments.len()
                )));
            };
            let claims = decode_claims(payload)?;
            (claims.region, epoch_seconds(&claims.exp)?)
        };

        Ok(Self {
            credential: SecretString::from(credential),
            region,
            expires,
        })
    }

    pub fn credential(&self) -> &str {
        self.credential.expose_secret()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Expiry as epoch seconds, exactly as carried by the `exp` claim.
    pub fn expires(&self) -> i64 {
        self.expires
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires, 0)
    }

    /// True once `expires - margin` has fallen behind `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let margin = i64::try_from(margin.as_secs()).unwrap_or(i64::MAX);
        self.expires.saturating_sub(margin) < now.timestamp()
    }

    pub fn is_expired(&self, margin: Duration) -> bool {
        self.is_expired_at(Utc::now(), margin)
    }
}

fn decode_claims(payload: &str) -> Result<Claims> {
    let padding = (4 - payload.len() % 4) % 4;
    let padded = format!("{payload}{}", "=".repeat(padding));
    let json = URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| SpeakError::TokenDecode(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&json)
        .map_err(|e| SpeakError::TokenDecode(format!("payload lacks region/exp claims: {e}")))
}

/// `exp` may arrive as an integer or a float; fractional seconds are dropped.
fn epoch_seconds(exp: &serde_json::Number) -> Result<i64> {
    if let Some(seconds) = exp.as_i64() {
        return Ok(seconds);
    }
    match exp.as_f64() {
        Some(seconds) if seconds.is_finite() && (i64::MIN as f64..i64::MAX as f64).contains(&seconds) => {
            Ok(seconds.trunc() as i64)
        }
        _ => Err(SpeakError::TokenDecode(format!("exp claim {exp} is out of range"))),
    }
}

/// Pulls fresh trial credentials from the public product page.
#[derive(Debug, Clone)]
pub struct TokenFetcher {
    client: Client,
    url: String,
}

impl TokenFetcher {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch the raw credential string.
    ///
    /// A page that answers with a non-200 status or without the credential is a
    /// `TokenRetrieval` error. A page that cannot be reached at all surfaces as
    /// `Http`, carrying the transport error instead of a status.
    pub async fn fetch(&self) -> Result<String> {
        debug!("Fetching trial credential from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SpeakError::TokenRetrieval {
                status: status.as_u16(),
                message: "Failed to retrieve token".into(),
            });
        }

        let page = response.text().await?;
        extract_credential(&page)
            .map(str::to_owned)
            .ok_or_else(|| SpeakError::TokenRetrieval {
                status: status.as_u16(),
                message: "Could not extract token from webpage".into(),
            })
    }

    /// Fetch and decode a new token.
    pub async fn fetch_token(&self) -> Result<Token> {
        Token::from_credential(self.fetch().await?)
    }
}

fn extract_credential(page: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#"token:\s*"([^"]+)""#).expect("token pattern is a valid regex"));
    pattern
        .captures(page)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Fixtures shared by the token, provider and synthesizer tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    pub fn credential(claims: &serde_json::Value) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    pub fn credential_for(region: &str, exp: i64) -> String {
        credential(&serde_json::json!({ "region": region, "exp": exp }))
    }

    pub fn trial_page(credential: &str) -> String {
        format!(
            "<html><script>\n  var localizedResources = {{\n    token: \"{credential}\",\n    region: \"ignored\"\n  }};\n</script></html>"
        )
    }
}
