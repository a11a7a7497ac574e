// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Wallet connection boundary and provider resolution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::engine::TransferEngine;
use crate::error::Result;

/// A signing provider bound to the connected account.
pub type SharedEngine = Arc<dyn TransferEngine>;

/// The active wallet connection.
///
/// A connection may expose its provider directly through the client, or only
/// through the connector, which can take time and can fail.
#[async_trait]
pub trait WalletConnection: Send + Sync {
    /// Provider available without waiting, if any.
    fn client_provider(&self) -> Option<SharedEngine>;

    async fn connector_provider(&self) -> Result<Option<SharedEngine>>;

    /// Asks the wallet to make `chain_id` its active network.
    async fn switch_chain(&self, chain_id: alloy_chains::Chain) -> Result<()>;
}

/// Picks the provider to sign with: the client's if present, else the
/// connector's. A failing connector resolves to `None`.
pub async fn resolve_provider<W>(wallet: &W) -> Option<SharedEngine>
where
    W: WalletConnection + ?Sized,
{
    if let Some(provider) = wallet.client_provider() {
        debug!(source = "client", event = "provider_resolved");
        return Some(provider);
    }

    match wallet.connector_provider().await {
        Ok(provider) => {
            debug!(
                source = "connector",
                found = provider.is_some(),
                event = "provider_resolved"
            );
            provider
        }
        Err(e) => {
            debug!(error = %e, event = "provider_resolution_failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEngine, FakeWallet};

    #[tokio::test]
    async fn test_client_provider_wins() {
        let client: SharedEngine = Arc::new(FakeEngine::new());
        let connector: SharedEngine = Arc::new(FakeEngine::new());
        let wallet = FakeWallet::new()
            .with_client(client.clone())
            .with_connector(connector);

        let resolved = resolve_provider(&wallet).await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &client));
        assert_eq!(wallet.connector_calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_connector() {
        let connector: SharedEngine = Arc::new(FakeEngine::new());
        let wallet = FakeWallet::new().with_connector(connector.clone());

        let resolved = resolve_provider(&wallet).await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &connector));
    }

    #[tokio::test]
    async fn test_connector_failure_resolves_to_none() {
        let wallet = FakeWallet::new()
            .with_connector(Arc::new(FakeEngine::new()))
            .with_failing_connector();
        assert!(resolve_provider(&wallet).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnected_wallet() {
        assert!(resolve_provider(&FakeWallet::new()).await.is_none());
    }
}
