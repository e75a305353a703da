//! Typed client for issuer key sets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use shc_core::IssuerUrl;
use shc_crypto::JwkSet;
use shc_vc::{HealthCard, VerificationOutcome};

use crate::config::IssuerClientConfig;
use crate::error::IssuerClientError;
use crate::retry::{send_with_retry, RetryPolicy};

#[derive(Debug, Clone)]
struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Fetches and caches issuer key sets. Cloning shares the cache.
#[derive(Debug, Clone)]
pub struct IssuerKeyClient {
    http: reqwest::Client,
    cache_ttl: Duration,
    retry: RetryPolicy,
    cache: Arc<Mutex<HashMap<String, CachedKeySet>>>,
}

impl IssuerKeyClient {
    /// Create a client from configuration.
    pub fn new(config: &IssuerClientConfig) -> Result<Self, IssuerClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| IssuerClientError::Http {
                url: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.retry_delay_ms),
            },
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Fetch the key set of `issuer`, reusing a cached copy while fresh.
    pub async fn fetch_key_set(&self, issuer: &IssuerUrl) -> Result<JwkSet, IssuerClientError> {
        let url = issuer.jwks_url();
        if let Some(keys) = self.cached(&url) {
            tracing::debug!(%url, "using cached key set");
            return Ok(keys);
        }

        let resp = send_with_retry(self.retry, &url, || self.http.get(&url).send())
            .await
            .map_err(|e| IssuerClientError::Http {
                url: url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IssuerClientError::ApiError { url, status, body });
        }

        let body = resp.text().await.map_err(|e| IssuerClientError::Http {
            url: url.clone(),
            source: e,
        })?;
        let keys = JwkSet::from_json(&body).map_err(|e| IssuerClientError::InvalidKeySet {
            url: url.clone(),
            source: e,
        })?;
        tracing::info!(%url, keys = keys.keys.len(), "fetched issuer key set");

        if !self.cache_ttl.is_zero() {
            self.cache.lock().insert(
                url,
                CachedKeySet {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(keys)
    }

    /// Fetch the card issuer's key set and verify the card against it.
    pub async fn verify_card(&self, card: &HealthCard) -> Result<(), IssuerClientError> {
        let keys = self.fetch_key_set(card.payload().issuer()).await?;
        card.verify_against(&keys)?;
        Ok(())
    }

    /// Like [`IssuerKeyClient::verify_card`], folding every failure,
    /// including network ones, into an outcome.
    pub async fn check_card(&self, card: &HealthCard) -> VerificationOutcome {
        match self.verify_card(card).await {
            Ok(()) => VerificationOutcome::Valid,
            Err(e) => {
                tracing::info!(iss = %card.payload().issuer(), error = %e, "card failed verification");
                VerificationOutcome::Invalid(e.to_string())
            }
        }
    }

    /// Drop all cached key sets.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn cached(&self, url: &str) -> Option<JwkSet> {
        let mut cache = self.cache.lock();
        match cache.get(url) {
            Some(entry) if entry.fetched_at.elapsed() < self.cache_ttl => Some(entry.keys.clone()),
            Some(_) => {
                cache.remove(url);
                None
            }
            None => None,
        }
    }
}
