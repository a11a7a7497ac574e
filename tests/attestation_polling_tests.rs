// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Attestation polling against a scripted attestation service and a fake clock.

use alloy_primitives::{Bytes, TxHash};
use arc_bridge::testing::{FakeAttestationProvider, FakeClock, IrisReply};
use arc_bridge::{AttestedMessage, BridgeError, BurnFee, IrisClient, PollingConfig};
use std::sync::Arc;
use std::time::Duration;

const SEPOLIA_DOMAIN: u32 = 0;

fn burn_hash() -> TxHash {
    TxHash::from([7u8; 32])
}

fn attested() -> AttestedMessage {
    AttestedMessage {
        message: Bytes::from_static(&[0x01, 0x02]),
        attestation: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
    }
}

fn client(provider: &FakeAttestationProvider, clock: &FakeClock) -> IrisClient {
    IrisClient::with_provider(Arc::new(provider.clone()), Arc::new(clock.clone()))
}

fn polling(max_attempts: u32, poll_interval_secs: u64) -> PollingConfig {
    PollingConfig::default()
        .with_max_attempts(max_attempts)
        .with_poll_interval_secs(poll_interval_secs)
}

#[tokio::test]
async fn test_attestation_timeout_with_fake_clock() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_always_pending();

    let max_attempts = 5;
    let poll_interval = 60;
    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(max_attempts, poll_interval))
        .await;

    assert!(
        matches!(result, Err(BridgeError::AttestationTimeout)),
        "Expected AttestationTimeout, got {result:?}"
    );
    assert_eq!(clock.sleep_count(), max_attempts as usize);
    assert_eq!(
        clock.total_sleep_time(),
        Duration::from_secs(poll_interval * max_attempts as u64)
    );
    assert_eq!(provider.call_count(), max_attempts as usize);
}

#[tokio::test]
async fn test_rate_limiting_backs_off_for_retry_after() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_response_sequence(vec![
        IrisReply::RateLimited {
            retry_after_seconds: 300,
        },
        IrisReply::RateLimited {
            retry_after_seconds: 120,
        },
        IrisReply::Complete(attested()),
    ]);

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(10, 5))
        .await
        .expect("attested after the back-off");

    assert_eq!(result, attested());
    assert_eq!(provider.call_count(), 3);
    assert_eq!(clock.sleep_count(), 2);
    // the poll interval plays no part in a 429 back-off
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(420));
}

#[tokio::test]
async fn test_not_found_is_retried_at_poll_interval() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_response_sequence(vec![
        IrisReply::NotFound,
        IrisReply::NotFound,
        IrisReply::NoMessages,
        IrisReply::Pending,
        IrisReply::Complete(attested()),
    ]);

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(10, 5))
        .await;

    assert_eq!(result.ok(), Some(attested()));
    assert_eq!(provider.call_count(), 5);
    assert_eq!(clock.sleep_count(), 4);
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(20));
}

#[tokio::test]
async fn test_malformed_body_is_retried() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_response_sequence(vec![IrisReply::Malformed, IrisReply::Complete(attested())]);

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(3, 30))
        .await;

    assert!(result.is_ok());
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(30));
}

#[tokio::test]
async fn test_failed_status_stops_polling() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_response_sequence(vec![IrisReply::Pending, IrisReply::Failed]);

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(10, 5))
        .await;

    match result {
        Err(BridgeError::AttestationFailed { reason }) => assert_eq!(reason, "Attestation failed"),
        other => panic!("Expected AttestationFailed, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 2);
    assert_eq!(clock.sleep_count(), 1);
}

#[tokio::test]
async fn test_complete_without_data_fails() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_response_sequence(vec![IrisReply::CompleteWithoutData]);

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), polling(10, 5))
        .await;

    assert!(matches!(
        result,
        Err(BridgeError::AttestationFailed { reason }) if reason == "Attestation missing"
    ));
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn test_immediate_completion_does_not_sleep() {
    let provider = FakeAttestationProvider::new();
    let clock = FakeClock::new();
    provider.add_complete_response(attested());

    let result = client(&provider, &clock)
        .poll_attestation(SEPOLIA_DOMAIN, burn_hash(), PollingConfig::fast_transfer())
        .await;

    assert_eq!(result.ok(), Some(attested()));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(clock.sleep_count(), 0);
}

#[tokio::test]
async fn test_burn_fee_picks_matching_threshold_or_zero() {
    let provider = FakeAttestationProvider::new().with_burn_fees(vec![
        BurnFee {
            finality_threshold: 1000,
            minimum_fee: 1.0,
        },
        BurnFee {
            finality_threshold: 2000,
            minimum_fee: 0.0,
        },
    ]);
    let iris = client(&provider, &FakeClock::new());

    let fast = iris.burn_fee(SEPOLIA_DOMAIN, 26, 1000).await.unwrap();
    assert_eq!(fast.minimum_fee, 1.0);

    let unknown = iris.burn_fee(SEPOLIA_DOMAIN, 26, 500).await.unwrap();
    assert_eq!(
        unknown,
        BurnFee {
            finality_threshold: 500,
            minimum_fee: 0.0,
        }
    );
}
