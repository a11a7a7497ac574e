// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Circle Iris API client: burn fee quotes and v2 message attestations.

use alloy_primitives::{hex::FromHex, Bytes, TxHash, U256};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, Instrument};
use url::Url;

use crate::clock::Clock;
use crate::config::{PollingConfig, BURN_FEES_PATH_V2, MESSAGES_PATH_V2};
use crate::error::{BridgeError, Result};
use crate::spans;

/// Back-off after a 429 without a usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5 * 60;

/// Response of `/v2/messages/{sourceDomain}?transactionHash=`.
///
/// One transaction can emit several `MessageSent` events, hence the list.
#[derive(Debug, Deserialize)]
pub struct V2MessagesResponse {
    pub messages: Vec<V2Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Message {
    pub status: AttestationStatus,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

/// The API sometimes sends the string `"PENDING"` where it means `null`.
fn deserialize_optional_bytes_or_pending<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => Bytes::from_hex(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A burn message together with its signed attestation, ready for
/// `receiveMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedMessage {
    pub message: Bytes,
    pub attestation: Bytes,
}

/// Minimum provider fee for one finality threshold.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnFee {
    pub finality_threshold: u32,
    /// Basis points of the burned amount, possibly fractional.
    pub minimum_fee: f64,
}

impl BurnFee {
    /// Fee in USDC base units for `amount`, rounded up.
    pub fn fee_for(&self, amount: U256) -> U256 {
        // hundredths of a basis point
        let scaled = (self.minimum_fee.max(0.0) * 100.0).round() as u64;
        let denominator = U256::from(1_000_000u64);
        (amount * U256::from(scaled) + denominator - U256::from(1u8)) / denominator
    }
}

/// One request to the attestation service.
///
/// `get_messages` fails with [`BridgeError::AttestationNotFound`] while the
/// burn is not indexed and with [`BridgeError::RateLimitExceeded`] on 429;
/// the polling loop in [`IrisClient`] retries both.
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    async fn get_messages(&self, source_domain: u32, tx_hash: TxHash) -> Result<V2MessagesResponse>;

    /// Fee schedule for a route, one entry per finality threshold.
    async fn get_burn_fees(&self, source_domain: u32, destination_domain: u32)
        -> Result<Vec<BurnFee>>;
}

/// HTTP implementation of [`AttestationProvider`] against the Iris API.
#[derive(Debug, Clone)]
pub struct IrisApi {
    base_url: Url,
    client: Client,
}

impl IrisApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn messages_url(&self, source_domain: u32, tx_hash: TxHash) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("{MESSAGES_PATH_V2}{source_domain}"))?;
        url.query_pairs_mut()
            .append_pair("transactionHash", &tx_hash.to_string());
        Ok(url)
    }

    pub fn burn_fees_url(&self, source_domain: u32, destination_domain: u32) -> Result<Url> {
        Ok(self.base_url.join(&format!(
            "{BURN_FEES_PATH_V2}{source_domain}/{destination_domain}"
        ))?)
    }
}

#[async_trait]
impl AttestationProvider for IrisApi {
    async fn get_messages(&self, source_domain: u32, tx_hash: TxHash) -> Result<V2MessagesResponse> {
        let url = self.messages_url(source_domain, tx_hash)?;
        trace!(url = %url, "Requesting attestation from Iris API");

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_seconds = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                return Err(BridgeError::RateLimitExceeded {
                    retry_after_seconds,
                });
            }
            StatusCode::NOT_FOUND => return Err(BridgeError::AttestationNotFound),
            _ => {}
        }

        let body = response.error_for_status()?.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!(error = %e, response_body = %body, event = "attestation_body_rejected");
            BridgeError::Json(e)
        })
    }

    async fn get_burn_fees(
        &self,
        source_domain: u32,
        destination_domain: u32,
    ) -> Result<Vec<BurnFee>> {
        let url = self.burn_fees_url(source_domain, destination_domain)?;
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

/// Fee lookup and attestation polling on top of an [`AttestationProvider`].
#[derive(Clone)]
pub struct IrisClient {
    provider: Arc<dyn AttestationProvider>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IrisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrisClient").finish_non_exhaustive()
    }
}

impl IrisClient {
    /// Client for the Iris API at `base_url`.
    pub fn new(base_url: Url, clock: Arc<dyn Clock>) -> Self {
        Self::with_provider(Arc::new(IrisApi::new(base_url)), clock)
    }

    pub fn with_provider(provider: Arc<dyn AttestationProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    pub async fn burn_fees(
        &self,
        source_domain: u32,
        destination_domain: u32,
    ) -> Result<Vec<BurnFee>> {
        let fees = self
            .provider
            .get_burn_fees(source_domain, destination_domain)
            .await?;
        debug!(
            source_domain,
            destination_domain,
            entries = fees.len(),
            event = "burn_fees_retrieved"
        );
        Ok(fees)
    }

    /// Fee entry matching `threshold`, or zero when the route has none.
    pub async fn burn_fee(
        &self,
        source_domain: u32,
        destination_domain: u32,
        threshold: u32,
    ) -> Result<BurnFee> {
        let fees = self.burn_fees(source_domain, destination_domain).await?;
        Ok(fees
            .into_iter()
            .find(|fee| fee.finality_threshold == threshold)
            .unwrap_or(BurnFee {
                finality_threshold: threshold,
                minimum_fee: 0.0,
            }))
    }

    /// Polls until the burn in `tx_hash` is attested.
    ///
    /// Every answer other than complete or failed costs one attempt. A 429
    /// sleeps for the advertised back-off, everything else for one poll
    /// interval.
    pub async fn poll_attestation(
        &self,
        source_domain: u32,
        tx_hash: TxHash,
        polling: PollingConfig,
    ) -> Result<AttestedMessage> {
        let span = spans::poll_attestation(
            tx_hash,
            source_domain,
            polling.max_attempts,
            polling.poll_interval_secs,
        );
        self.poll_attestation_inner(source_domain, tx_hash, polling)
            .instrument(span)
            .await
    }

    async fn poll_attestation_inner(
        &self,
        source_domain: u32,
        tx_hash: TxHash,
        polling: PollingConfig,
    ) -> Result<AttestedMessage> {
        let interval = Duration::from_secs(polling.poll_interval_secs);

        info!(event = "attestation_polling_started");

        for attempt in 1..=polling.max_attempts {
            let response = match self
                .provider
                .get_messages(source_domain, tx_hash)
                .instrument(spans::attestation_attempt(attempt))
                .await
            {
                Ok(response) => response,
                Err(BridgeError::RateLimitExceeded {
                    retry_after_seconds,
                }) => {
                    debug!(
                        sleep_secs = retry_after_seconds,
                        event = "rate_limit_exceeded"
                    );
                    self.clock
                        .sleep(Duration::from_secs(retry_after_seconds))
                        .await;
                    continue;
                }
                // not indexed yet
                Err(BridgeError::AttestationNotFound) => {
                    debug!(attempt, event = "attestation_not_found");
                    self.clock.sleep(interval).await;
                    continue;
                }
                Err(BridgeError::Json(e)) => {
                    error!(error = %e, attempt, event = "attestation_decode_failed");
                    self.clock.sleep(interval).await;
                    continue;
                }
                Err(e) => {
                    spans::record_error_with_context(
                        "HttpRequestFailed",
                        &format!("Failed to fetch attestation: {e}"),
                        None,
                    );
                    error!(error = %e, attempt, event = "attestation_http_request_failed");
                    return Err(e);
                }
            };

            let Some(message) = response.messages.into_iter().next() else {
                debug!(attempt, event = "attestation_no_messages");
                self.clock.sleep(interval).await;
                continue;
            };

            match message.status {
                AttestationStatus::Complete => {
                    let (Some(message), Some(attestation)) = (message.message, message.attestation)
                    else {
                        spans::record_error_with_context(
                            "AttestationDataMissing",
                            "Attestation status is complete but data is missing",
                            None,
                        );
                        return Err(BridgeError::AttestationFailed {
                            reason: "Attestation missing".to_string(),
                        });
                    };
                    info!(
                        attempt,
                        attestation_length_bytes = attestation.len(),
                        event = "attestation_complete"
                    );
                    return Ok(AttestedMessage {
                        message,
                        attestation,
                    });
                }
                AttestationStatus::Failed => {
                    spans::record_error_with_context(
                        "AttestationFailed",
                        "Attestation service returned failed status",
                        None,
                    );
                    error!(attempt, event = "attestation_failed");
                    return Err(BridgeError::AttestationFailed {
                        reason: "Attestation failed".to_string(),
                    });
                }
                AttestationStatus::Pending | AttestationStatus::PendingConfirmations => {
                    debug!(attempt, status = ?message.status, event = "attestation_pending");
                    self.clock.sleep(interval).await;
                }
            }
        }

        spans::record_error(&BridgeError::AttestationTimeout);
        error!(
            total_duration_secs = polling.total_timeout_secs(),
            event = "attestation_timeout"
        );
        Err(BridgeError::AttestationTimeout)
    }
}
