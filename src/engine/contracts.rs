// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract bindings for the three calls a transfer makes: ERC-20 `approve`,
//! TokenMessengerV2 `depositForBurn` and MessageTransmitterV2
//! `receiveMessage`.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::debug;

use Erc20::Erc20Instance;
use MessageTransmitterV2::MessageTransmitterV2Instance;
use TokenMessengerV2::TokenMessengerV2Instance;

pub struct Erc20Contract<P: Provider<Ethereum>> {
    instance: Erc20Instance<P>,
}

impl<P: Provider<Ethereum>> Erc20Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: Erc20Instance::new(address, provider),
        }
    }

    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, alloy_contract::Error> {
        self.instance.allowance(owner, spender).call().await
    }

    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        debug!(
            from = %from,
            spender = %spender,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "approve_transaction_created"
        );

        self.instance
            .approve(spender, amount)
            .from(from)
            .into_transaction_request()
    }
}

/// Parameters of a v2 `depositForBurn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositForBurn {
    pub amount: U256,
    pub destination_domain: u32,
    pub recipient: Address,
    pub burn_token: Address,
    pub max_fee: U256,
    pub min_finality_threshold: u32,
}

pub struct TokenMessengerV2Contract<P: Provider<Ethereum>> {
    instance: TokenMessengerV2Instance<P>,
}

impl<P: Provider<Ethereum>> TokenMessengerV2Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: TokenMessengerV2Instance::new(address, provider),
        }
    }

    pub fn deposit_for_burn_transaction(
        &self,
        from: Address,
        params: DepositForBurn,
    ) -> TransactionRequest {
        debug!(
            from = %from,
            recipient = %params.recipient,
            destination_domain = params.destination_domain,
            amount = %params.amount,
            max_fee = %params.max_fee,
            min_finality_threshold = params.min_finality_threshold,
            contract_address = %self.instance.address(),
            event = "deposit_for_burn_transaction_created"
        );

        self.instance
            .depositForBurn(
                params.amount,
                params.destination_domain,
                params.recipient.into_word(),
                params.burn_token,
                // any caller may relay the mint
                B256::ZERO,
                params.max_fee,
                params.min_finality_threshold,
            )
            .from(from)
            .into_transaction_request()
    }
}

pub struct MessageTransmitterV2Contract<P: Provider<Ethereum>> {
    instance: MessageTransmitterV2Instance<P>,
}

impl<P: Provider<Ethereum>> MessageTransmitterV2Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: MessageTransmitterV2Instance::new(address, provider),
        }
    }

    pub fn receive_message_transaction(
        &self,
        message: Bytes,
        attestation: Bytes,
        from: Address,
    ) -> TransactionRequest {
        debug!(
            from = %from,
            message_len = message.len(),
            attestation_len = attestation.len(),
            contract_address = %self.instance.address(),
            event = "receive_message_transaction_created"
        );

        self.instance
            .receiveMessage(message, attestation)
            .from(from)
            .into_transaction_request()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Erc20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
);

sol!(
    #[allow(missing_docs, clippy::too_many_arguments)]
    #[sol(rpc)]
    contract TokenMessengerV2 {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external;
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MessageTransmitterV2 {
        function receiveMessage(bytes calldata message, bytes calldata attestation)
            external
            returns (bool success);
    }
);
