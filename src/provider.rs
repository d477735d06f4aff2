//! Owned token cache with renew-on-expiry.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::token::{Token, TokenFetcher, DEFAULT_MARGIN};

/// Observable lifecycle state of the cached token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Valid,
    Expired,
}

/// Hands out a valid trial token, renewing it when the cached one is within
/// the safety margin of its expiry.
///
/// The read-check-renew-replace sequence runs under one lock, so concurrent
/// callers never renew twice and never observe a half-updated token.
pub struct TokenProvider {
    fetcher: TokenFetcher,
    margin: Duration,
    cached: Mutex<Option<Token>>,
}

impl TokenProvider {
    pub fn new(fetcher: TokenFetcher) -> Self {
        Self {
            fetcher,
            margin: DEFAULT_MARGIN,
            cached: Mutex::new(None),
        }
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    /// Seed the cache, e.g. with a token obtained earlier in the process.
    pub fn with_token(mut self, token: Token) -> Self {
        self.cached = Mutex::new(Some(token));
        self
    }

    /// Return the cached token, renewing first if it is absent or expired.
    pub async fn current_token(&self) -> Result<Token> {
        let mut cached = self.cached.lock().await;

        match cached.as_ref() {
            Some(token) if !token.is_expired(self.margin) => return Ok(token.clone()),
            Some(token) => debug!("Cached token expired at {}, renewing", token.expires()),
            None => debug!("No cached token, fetching one"),
        }

        let token = self.fetcher.fetch_token().await?;
        info!("Trial token renewed (region: {}, expires: {})", token.region(), token.expires());
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Replace the cached token unconditionally.
    pub async fn force_renew(&self) -> Result<()> {
        let mut cached = self.cached.lock().await;
        let token = self.fetcher.fetch_token().await?;
        info!("Trial token force-renewed (region: {}, expires: {})", token.region(), token.expires());
        *cached = Some(token);
        Ok(())
    }

    pub async fn state(&self) -> TokenState {
        match self.cached.lock().await.as_ref() {
            None => TokenState::Absent,
            Some(token) if token.is_expired_at(Utc::now(), self.margin) => TokenState::Expired,
            Some(_) => TokenState::Valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::SpeakError;
    use crate::token::fixtures::{credential_for, trial_page};

    async fn trial_server(region: &str, exp: i64, expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(trial_page(&credential_for(region, exp))),
            )
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    fn provider_for(server: &MockServer) -> TokenProvider {
        TokenProvider::new(TokenFetcher::new(Client::new(), server.uri()))
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[tokio::test]
    async fn expired_token_is_renewed_once() {
        let server = trial_server("eastus", now() + 600, 1).await;
        let stale = Token::from_credential(credential_for("westus", now() - 100)).unwrap();
        let provider = provider_for(&server).with_token(stale);

        assert_eq!(provider.state().await, TokenState::Expired);

        let token = provider.current_token().await.unwrap();
        assert!(token.expires() > now());
        assert_eq!(token.region(), "eastus");
        assert_eq!(provider.state().await, TokenState::Valid);
    }

    #[tokio::test]
    async fn valid_token_is_reused() {
        let server = trial_server("eastus", now() + 600, 0).await;
        let fresh = Token::from_credential(credential_for("westus", now() + 300)).unwrap();
        let provider = provider_for(&server).with_token(fresh);

        for _ in 0..3 {
            assert_eq!(provider.current_token().await.unwrap().region(), "westus");
        }
    }

    #[tokio::test]
    async fn token_inside_margin_counts_as_expired() {
        let server = trial_server("eastus", now() + 600, 1).await;
        let nearly = Token::from_credential(credential_for("westus", now() + 5)).unwrap();
        let provider = provider_for(&server).with_token(nearly);

        assert_eq!(provider.current_token().await.unwrap().region(), "eastus");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_renewal() {
        let server = trial_server("eastus", now() + 600, 1).await;
        let provider = Arc::new(provider_for(&server));
        assert_eq!(provider.state().await, TokenState::Absent);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.current_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().region(), "eastus");
        }
    }

    #[tokio::test]
    async fn force_renew_replaces_valid_token() {
        let server = trial_server("japaneast", now() + 600, 1).await;
        let fresh = Token::from_credential(credential_for("westus", now() + 300)).unwrap();
        let provider = provider_for(&server).with_token(fresh);

        provider.force_renew().await.unwrap();
        assert_eq!(provider.current_token().await.unwrap().region(), "japaneast");
    }

    #[tokio::test]
    async fn failed_renewal_propagates_and_keeps_old_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let stale = Token::from_credential(credential_for("westus", now() - 100)).unwrap();
        let provider = provider_for(&server).with_token(stale);

        let err = provider.current_token().await.unwrap_err();
        assert!(matches!(err, SpeakError::TokenRetrieval { status: 500, .. }));
        assert_eq!(provider.state().await, TokenState::Expired);
    }
}
