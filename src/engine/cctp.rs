// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_json_rpc::RpcError;
use alloy_network::Ethereum;
use alloy_primitives::{utils::format_units, Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use bon::Builder;
use tracing::{debug, error, info, warn, Instrument, Span};

use super::contracts::{
    DepositForBurn, Erc20Contract, MessageTransmitterV2Contract, TokenMessengerV2Contract,
};
use super::iris::{AttestedMessage, IrisClient};
use super::types::{BridgeResult, Estimate, Fee, FeeType, GasFee, StepResult};
use super::{TransferEngine, TransferRequest};
use crate::chain::addresses::{
    CCTP_V2_MESSAGE_TRANSMITTER_TESTNET, CCTP_V2_TOKEN_MESSENGER_TESTNET,
};
use crate::chain::{Chain, USDC_DECIMALS};
use crate::config::PollingConfig;
use crate::error::{BridgeError, Result};
use crate::outcome::is_rejection_message;
use crate::progress::StepName;
use crate::spans;

/// Used when the node refuses to estimate `approve`.
pub const APPROVE_GAS_FALLBACK: u64 = 60_000;
/// Used when `depositForBurn` cannot be simulated, typically because the
/// allowance is not in place yet.
pub const BURN_GAS_FALLBACK: u64 = 200_000;
/// `receiveMessage` cannot be simulated before the attestation exists.
pub const MINT_GAS_LIMIT: u64 = 300_000;

const GAS_BUFFER_PERCENT: u64 = 20;

/// EIP-1193 "user rejected request".
const USER_REJECTED_CODE: i64 = 4001;

/// CCTP v2 transfer engine over alloy providers.
///
/// One provider per supported chain; both must sign for `account`.
///
/// ```rust,no_run
/// use alloy_network::EthereumWallet;
/// use alloy_provider::ProviderBuilder;
/// use alloy_signer_local::PrivateKeySigner;
/// use arc_bridge::{CctpEngine, IrisClient, TokioClock};
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer: PrivateKeySigner = "0x...".parse()?;
/// let account = signer.address();
/// let wallet = EthereumWallet::from(signer);
/// let sepolia = ProviderBuilder::new()
///     .wallet(wallet.clone())
///     .connect_http("https://ethereum-sepolia-rpc.publicnode.com".parse()?);
/// let arc = ProviderBuilder::new()
///     .wallet(wallet)
///     .connect_http("https://rpc.testnet.arc.network/".parse()?);
///
/// let engine = CctpEngine::builder()
///     .sepolia_provider(sepolia)
///     .arc_provider(arc)
///     .account(account)
///     .iris(IrisClient::new(
///         "https://iris-api-sandbox.circle.com".parse()?,
///         Arc::new(TokioClock::new()),
///     ))
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Clone)]
pub struct CctpEngine<P: Provider<Ethereum> + Clone> {
    sepolia_provider: P,
    arc_provider: P,
    account: Address,
    iris: IrisClient,
    /// Overrides the per-speed attestation polling preset.
    polling: Option<PollingConfig>,
}

impl<P: Provider<Ethereum> + Clone + 'static> CctpEngine<P> {
    pub fn provider(&self, chain: Chain) -> &P {
        match chain {
            Chain::EthereumSepolia => &self.sepolia_provider,
            Chain::ArcTestnet => &self.arc_provider,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    fn burn_params(&self, request: &TransferRequest, amount: U256, max_fee: U256) -> DepositForBurn {
        DepositForBurn {
            amount,
            destination_domain: request.to.domain_id(),
            recipient: request.recipient.unwrap_or(self.account),
            burn_token: request.from.usdc_address(),
            max_fee,
            min_finality_threshold: request.speed.finality_threshold(),
        }
    }

    fn approve_transaction(&self, chain: Chain, amount: U256) -> TransactionRequest {
        Erc20Contract::new(chain.usdc_address(), self.provider(chain).clone()).approve_transaction(
            self.account,
            CCTP_V2_TOKEN_MESSENGER_TESTNET,
            amount,
        )
    }

    fn burn_transaction(&self, chain: Chain, params: DepositForBurn) -> TransactionRequest {
        TokenMessengerV2Contract::new(CCTP_V2_TOKEN_MESSENGER_TESTNET, self.provider(chain).clone())
            .deposit_for_burn_transaction(self.account, params)
    }

    /// Gas estimate plus buffer, or `fallback` when the node refuses.
    async fn estimate_gas_or(&self, chain: Chain, tx: &TransactionRequest, fallback: u64) -> u64 {
        match self.provider(chain).estimate_gas(tx.clone()).await {
            Ok(estimate) => with_gas_buffer(estimate),
            Err(e) => {
                debug!(
                    chain = %chain,
                    error = %e,
                    fallback,
                    event = "gas_estimate_fallback"
                );
                fallback
            }
        }
    }

    async fn run_estimate(&self, request: &TransferRequest) -> Result<Estimate> {
        let amount = request.validate()?;
        let (source, destination) = (request.from, request.to);

        let fee = self
            .iris
            .burn_fee(
                source.domain_id(),
                destination.domain_id(),
                request.speed.finality_threshold(),
            )
            .await?;
        let provider_fee = fee.fee_for(amount);

        let approve_tx = self.approve_transaction(source, amount);
        let approve_gas = self
            .estimate_gas_or(source, &approve_tx, APPROVE_GAS_FALLBACK)
            .await;

        // depositForBurn reverts in simulation until the allowance covers the amount
        let allowance = Erc20Contract::new(source.usdc_address(), self.provider(source).clone())
            .allowance(self.account, CCTP_V2_TOKEN_MESSENGER_TESTNET)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, event = "allowance_lookup_failed");
                U256::ZERO
            });
        let burn_gas = if allowance >= amount {
            let burn_tx = self.burn_transaction(source, self.burn_params(request, amount, provider_fee));
            self.estimate_gas_or(source, &burn_tx, BURN_GAS_FALLBACK).await
        } else {
            BURN_GAS_FALLBACK
        };

        let source_gas_price = self.provider(source).get_gas_price().await?;
        let destination_gas_price = self.provider(destination).get_gas_price().await?;

        let estimate = Estimate {
            gas_fees: vec![
                GasFee::new(StepName::Approve, source, approve_gas, source_gas_price),
                GasFee::new(StepName::Burn, source, burn_gas, source_gas_price),
                GasFee::new(
                    StepName::Mint,
                    destination,
                    MINT_GAS_LIMIT,
                    destination_gas_price,
                ),
            ],
            fees: vec![Fee {
                fee_type: FeeType::Provider,
                amount: format_units(provider_fee, USDC_DECIMALS)?,
                token: "USDC".to_string(),
            }],
        };

        info!(
            approve_gas,
            burn_gas,
            provider_fee = %provider_fee,
            event = "estimate_completed"
        );
        Ok(estimate)
    }

    /// Submits one transaction and waits for its receipt.
    ///
    /// Returns `Err` only for wallet rejection; every other failure is
    /// reported in the step result.
    async fn send_step(
        &self,
        step: StepName,
        chain: Chain,
        tx: TransactionRequest,
    ) -> Result<(StepResult, Option<TxHash>)> {
        let span = spans::send_step(step, chain);
        async move {
            let pending = match self.provider(chain).send_transaction(tx).await {
                Ok(pending) => pending,
                Err(e) if is_user_rejection(&e) => {
                    warn!(step = %step, event = "step_rejected_by_user");
                    return Err(BridgeError::UserRejected(e.to_string()));
                }
                Err(e) => {
                    spans::record_error(&e);
                    error!(step = %step, error = %e, event = "step_submission_failed");
                    return Ok((StepResult::error(step, e.to_string()), None));
                }
            };

            let tx_hash = *pending.tx_hash();
            let explorer_url = chain.tx_url(&tx_hash);
            Span::current().record("tx_hash", tracing::field::display(tx_hash));
            info!(step = %step, tx_hash = %tx_hash, event = "step_submitted");

            let result = match pending.get_receipt().await {
                Ok(receipt) if receipt.status() => {
                    info!(step = %step, tx_hash = %tx_hash, event = "step_confirmed");
                    StepResult::success(step, Some(tx_hash.to_string()), Some(explorer_url))
                }
                Ok(_) => {
                    spans::record_error_with_context("TransactionReverted", "receipt status 0", None);
                    error!(step = %step, tx_hash = %tx_hash, event = "step_reverted");
                    StepResult::failed(step, tx_hash.to_string(), explorer_url)
                }
                Err(e) => {
                    spans::record_error(&e);
                    error!(step = %step, tx_hash = %tx_hash, error = %e, event = "step_receipt_failed");
                    StepResult {
                        tx_hash: Some(tx_hash.to_string()),
                        explorer_url: Some(explorer_url),
                        ..StepResult::error(step, e.to_string())
                    }
                }
            };
            Ok((result, Some(tx_hash)))
        }
        .instrument(span)
        .await
    }

    async fn run_bridge(&self, request: &TransferRequest) -> Result<BridgeResult> {
        let amount = request.validate()?;
        let (source, destination) = (request.from, request.to);

        let max_fee = self
            .iris
            .burn_fee(
                source.domain_id(),
                destination.domain_id(),
                request.speed.finality_threshold(),
            )
            .await?
            .fee_for(amount);

        let result = BridgeResult {
            source,
            destination,
            amount: request.amount.clone(),
            recipient: Some(request.recipient.unwrap_or(self.account)),
            speed: request.speed,
            steps: Vec::with_capacity(StepName::ALL.len()),
        };

        info!(
            amount = %amount,
            max_fee = %max_fee,
            account = %self.account,
            event = "bridge_started"
        );

        let steps = CctpSteps {
            engine: self,
            request,
            amount,
            max_fee,
        };
        run_steps(&steps, result).await
    }
}

/// The four actions of one transfer, in the order [`run_steps`] calls them.
///
/// `approve`, `burn` and `mint` report failures in the step result and
/// return `Err` only when the wallet rejected the request.
#[async_trait]
trait TransferSteps: Send + Sync {
    async fn approve(&self) -> Result<(StepResult, Option<TxHash>)>;
    async fn burn(&self) -> Result<(StepResult, Option<TxHash>)>;
    async fn attest(&self, burn_hash: TxHash) -> Result<AttestedMessage>;
    async fn mint(&self, attested: AttestedMessage) -> Result<(StepResult, Option<TxHash>)>;
}

/// Runs approve → burn → attestation → mint, halting at the first failure.
///
/// A failed mint is an error rather than a halted result: the burn is final
/// and the mint can be retried once destination gas is available.
async fn run_steps<S: TransferSteps + ?Sized>(
    steps: &S,
    mut result: BridgeResult,
) -> Result<BridgeResult> {
    let (step, _) = steps.approve().await?;
    if push_step(&mut result, step) {
        return Ok(result);
    }

    let (step, burn_hash) = steps.burn().await?;
    if push_step(&mut result, step) {
        return Ok(result);
    }
    let burn_hash = burn_hash
        .ok_or_else(|| BridgeError::Provider("burn transaction hash missing".to_string()))?;

    let attested = match steps.attest(burn_hash).await {
        Ok(attested) => attested,
        Err(e) => {
            push_step(&mut result, StepResult::error(StepName::Attestation, e.to_string()));
            return Ok(result);
        }
    };
    push_step(&mut result, StepResult::success(StepName::Attestation, None, None));

    let (step, _) = steps.mint(attested).await?;
    if step.state.is_failure() {
        let reason = step
            .error
            .unwrap_or_else(|| "Transaction reverted".to_string());
        return Err(BridgeError::StepFailed {
            step: StepName::Mint,
            reason,
        });
    }
    push_step(&mut result, step);

    info!(burn_tx_hash = %burn_hash, event = "bridge_completed");
    Ok(result)
}

/// [`TransferSteps`] against the engine's providers and Iris client.
struct CctpSteps<'a, P: Provider<Ethereum> + Clone> {
    engine: &'a CctpEngine<P>,
    request: &'a TransferRequest,
    amount: U256,
    max_fee: U256,
}

#[async_trait]
impl<P> TransferSteps for CctpSteps<'_, P>
where
    P: Provider<Ethereum> + Clone + 'static,
{
    async fn approve(&self) -> Result<(StepResult, Option<TxHash>)> {
        let source = self.request.from;
        let tx = self.engine.approve_transaction(source, self.amount);
        self.engine.send_step(StepName::Approve, source, tx).await
    }

    async fn burn(&self) -> Result<(StepResult, Option<TxHash>)> {
        let source = self.request.from;
        let params = self
            .engine
            .burn_params(self.request, self.amount, self.max_fee);
        let tx = self.engine.burn_transaction(source, params);
        self.engine.send_step(StepName::Burn, source, tx).await
    }

    async fn attest(&self, burn_hash: TxHash) -> Result<AttestedMessage> {
        let polling = self
            .engine
            .polling
            .unwrap_or_else(|| PollingConfig::for_speed(self.request.speed));
        self.engine
            .iris
            .poll_attestation(self.request.from.domain_id(), burn_hash, polling)
            .await
    }

    async fn mint(&self, attested: AttestedMessage) -> Result<(StepResult, Option<TxHash>)> {
        let destination = self.request.to;
        let tx = MessageTransmitterV2Contract::new(
            CCTP_V2_MESSAGE_TRANSMITTER_TESTNET,
            self.engine.provider(destination).clone(),
        )
        .receive_message_transaction(attested.message, attested.attestation, self.engine.account);
        self.engine.send_step(StepName::Mint, destination, tx).await
    }
}

#[async_trait]
impl<P> TransferEngine for CctpEngine<P>
where
    P: Provider<Ethereum> + Clone + 'static,
{
    async fn estimate(&self, request: &TransferRequest) -> Result<Estimate> {
        let span = spans::estimate(request.from, request.to, &request.amount);
        let result = self.run_estimate(request).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn bridge(&self, request: &TransferRequest) -> Result<BridgeResult> {
        let span = spans::bridge(
            request.from,
            request.to,
            &request.amount,
            request.speed.as_str(),
        );
        let result = self.run_bridge(request).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }
}

/// Appends `step`; true when processing must halt.
fn push_step(result: &mut BridgeResult, step: StepResult) -> bool {
    let failed = step.state.is_failure();
    if failed {
        warn!(step = %step.name, state = ?step.state, event = "bridge_halted");
    }
    result.steps.push(step);
    failed
}

/// Estimate plus the safety buffer.
fn with_gas_buffer(estimate: u64) -> u64 {
    estimate.saturating_mul(100 + GAS_BUFFER_PERCENT) / 100
}

fn is_user_rejection(error: &RpcError<TransportErrorKind>) -> bool {
    error
        .as_error_resp()
        .is_some_and(|payload| payload.code == USER_REJECTED_CODE)
        || is_rejection_message(&error.to_string())
}
