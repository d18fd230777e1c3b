// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC ledger gateway backed by alloy.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::contracts::{IController, IGeneNFT, IPCSPToken};
use super::gateway::{LedgerError, LedgerGateway};
use super::receipt::{wait_settled, SettlementReceipt};
use super::signing::SigningIdentity;
use super::types::{
    format_units, LedgerHoldings, NetworkConfig, SessionId, SettlementOutcome,
    SettlementRequest,
};

/// HTTP provider type for read-only calls (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Ledger gateway talking to the Controller contract over JSON-RPC.
pub struct RpcLedgerGateway {
    /// Network configuration
    network: NetworkConfig,
    rpc_url: url::Url,
    /// Read-only provider for view calls
    reader: HttpProvider,
    controller: Address,
    identity: Arc<SigningIdentity>,
    settlement_timeout: Duration,
}

impl RpcLedgerGateway {
    pub fn new(
        network: NetworkConfig,
        controller_address: &str,
        identity: Arc<SigningIdentity>,
        settlement_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let rpc_url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let controller = Address::from_str(controller_address)
            .map_err(|e| LedgerError::InvalidAddress(format!("Invalid controller address: {}", e)))?;

        if identity.chain_id() != network.chain_id {
            return Err(LedgerError::Authorization(format!(
                "signing identity is bound to chain {}, network is chain {}",
                identity.chain_id(),
                network.chain_id
            )));
        }

        let reader = ProviderBuilder::new().connect_http(rpc_url.clone());

        Ok(Self {
            network,
            rpc_url,
            reader,
            controller,
            identity,
            settlement_timeout,
        })
    }

    /// Sign, submit and wait for a Controller call.
    async fn submit_and_settle(&self, call_data: Bytes) -> Result<SettlementReceipt, LedgerError> {
        let auth = self.identity.authorize(self.network.chain_id)?;

        let provider = ProviderBuilder::new()
            .wallet(auth.wallet)
            .connect_http(self.rpc_url.clone());

        let mut tx = TransactionRequest::default()
            .from(auth.sender)
            .to(self.controller)
            .input(call_data.into());
        tx.chain_id = Some(auth.chain_id);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| LedgerError::Submission(e.to_string()))?;

        tracing::debug!(tx_hash = ?pending.tx_hash(), "Controller transaction submitted");

        wait_settled(self.settlement_timeout, async move {
            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| LedgerError::Settlement(e.to_string()))?;
            Ok(settlement_receipt(&receipt))
        })
        .await
    }

    async fn token_addresses(&self) -> Result<(Address, Address), LedgerError> {
        let controller = IController::new(self.controller, self.reader.clone());

        let nft: Address = controller
            .geneNFT()
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("geneNFT(): {}", e)))?;
        let token: Address = controller
            .pcspToken()
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("pcspToken(): {}", e)))?;

        Ok((nft, token))
    }
}

#[async_trait]
impl LedgerGateway for RpcLedgerGateway {
    async fn open_session(&self, document_id: &str) -> Result<SessionId, LedgerError> {
        let call = IController::uploadDataCall {
            docId: document_id.to_string(),
        };
        let receipt = self.submit_and_settle(call.abi_encode().into()).await?;
        receipt.session_opened(self.controller)
    }

    async fn confirm_and_settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, LedgerError> {
        let call = IController::confirmCall {
            docId: request.document_id.clone(),
            contentHash: request.content_digest.to_hex(),
            proof: request.proof.clone(),
            sessionId: request.session.as_u256(),
            riskScore: U256::from(request.tier.score()),
        };
        let receipt = self.submit_and_settle(call.abi_encode().into()).await?;
        receipt.settlement_outcome(self.controller)
    }

    async fn holdings(&self, owner: &str) -> Result<LedgerHoldings, LedgerError> {
        let addr = Address::from_str(owner)
            .map_err(|e| LedgerError::InvalidAddress(e.to_string()))?;

        let native = self
            .reader
            .get_balance(addr)
            .await
            .map_err(|e| LedgerError::Query(e.to_string()))?;

        let (nft_address, token_address) = self.token_addresses().await?;

        let asset_count: U256 = IGeneNFT::new(nft_address, self.reader.clone())
            .balanceOf(addr)
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("GeneNFT.balanceOf: {}", e)))?;

        let token = IPCSPToken::new(token_address, self.reader.clone());
        let decimals: u8 = token
            .decimals()
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("PCSP.decimals: {}", e)))?;
        let reward_balance: U256 = token
            .balanceOf(addr)
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("PCSP.balanceOf: {}", e)))?;

        Ok(LedgerHoldings {
            address: addr.to_checksum(None),
            network: self.network.name.clone(),
            chain_id: self.network.chain_id,
            native_balance_raw: native.to_string(),
            asset_count: asset_count.to_string(),
            reward_balance_raw: reward_balance.to_string(),
            reward_balance: format_units(reward_balance, decimals),
        })
    }

    async fn asset_owner(&self, token_id: U256) -> Result<String, LedgerError> {
        let (nft_address, _) = self.token_addresses().await?;
        let owner: Address = IGeneNFT::new(nft_address, self.reader.clone())
            .ownerOf(token_id)
            .call()
            .await
            .map_err(|e| LedgerError::Query(format!("GeneNFT.ownerOf: {}", e)))?;
        Ok(owner.to_checksum(None))
    }

    fn sender_address(&self) -> String {
        self.identity.address()
    }

    fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

fn settlement_receipt(receipt: &TransactionReceipt) -> SettlementReceipt {
    SettlementReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or(0),
        success: receipt.status(),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const CONTROLLER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn identity(chain_id: u64) -> Arc<SigningIdentity> {
        Arc::new(SigningIdentity::from_hex(DEV_KEY, chain_id).unwrap())
    }

    #[test]
    fn constructs_without_contacting_the_node() {
        let gateway = RpcLedgerGateway::new(
            NetworkConfig::life("http://127.0.0.1:8545"),
            CONTROLLER,
            identity(9999),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(gateway.network().chain_id, 9999);
        assert_eq!(
            gateway.sender_address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn rejects_bad_configuration() {
        let bad_url = RpcLedgerGateway::new(
            NetworkConfig::life("not a url"),
            CONTROLLER,
            identity(9999),
            Duration::from_secs(30),
        );
        assert!(matches!(bad_url, Err(LedgerError::InvalidRpcUrl(_))));

        let bad_controller = RpcLedgerGateway::new(
            NetworkConfig::life("http://127.0.0.1:8545"),
            "0x1234",
            identity(9999),
            Duration::from_secs(30),
        );
        assert!(matches!(bad_controller, Err(LedgerError::InvalidAddress(_))));

        let wrong_chain = RpcLedgerGateway::new(
            NetworkConfig::life("http://127.0.0.1:8545"),
            CONTROLLER,
            identity(1),
            Duration::from_secs(30),
        );
        assert!(matches!(wrong_chain, Err(LedgerError::Authorization(_))));
    }

    #[tokio::test]
    async fn unreachable_node_surfaces_query_errors() {
        let gateway = RpcLedgerGateway::new(
            NetworkConfig::life("http://127.0.0.1:1"),
            CONTROLLER,
            identity(9999),
            Duration::from_secs(30),
        )
        .unwrap();
        let owner = gateway.sender_address();
        assert!(matches!(
            gateway.holdings(&owner).await,
            Err(LedgerError::Query(_))
        ));
        assert!(matches!(
            gateway.asset_owner(U256::from(1)).await,
            Err(LedgerError::Query(_))
        ));
    }
}
