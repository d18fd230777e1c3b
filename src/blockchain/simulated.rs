// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Simulated Ledger
//!
//! In-process model of the Controller contract, selected with
//! `LEDGER_MODE=simulated`. Every call goes through the same path as the RPC
//! gateway: authorize against the configured chain, produce a receipt whose
//! logs are ABI-encoded Controller events, wait for settlement within the
//! configured bound, then decode the receipt.
//!
//! ## Contract rules modelled
//!
//! - `uploadData` mints sequential session ids starting at 1
//! - `confirm` refuses unknown sessions, sessions opened for another
//!   document and sessions that were already confirmed, without minting a
//!   transaction
//! - a successful `confirm` mints one GeneNFT to the sender and credits the
//!   tier reward in PCSP

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use alloy::{
    primitives::{keccak256, Address, Log, B256, U256},
    sol_types::SolEvent,
};
use async_trait::async_trait;

use super::contracts::IController::{GeneNFTMinted, PCSPRewarded, UploadData};
use super::gateway::{LedgerError, LedgerGateway, SessionRejection};
use super::receipt::{wait_settled, SettlementReceipt};
use super::signing::SigningIdentity;
use super::types::{
    format_units, reward_for_tier, LedgerHoldings, NetworkConfig, SessionId, SettlementOutcome,
    SettlementRequest, PCSP_DECIMALS,
};

/// Address the simulated Controller "lives" at.
const SIMULATED_CONTROLLER: Address = Address::repeat_byte(0xc0);

#[derive(Debug)]
struct SessionRecord {
    document_id: String,
    consumed: bool,
}

#[derive(Debug, Default)]
struct ChainState {
    block_number: u64,
    tx_count: u64,
    next_session: u64,
    next_token_id: u64,
    sessions: HashMap<U256, SessionRecord>,
    asset_owners: HashMap<U256, Address>,
    reward_balances: HashMap<Address, U256>,
}

impl ChainState {
    fn next_tx(&mut self) -> (B256, u64) {
        self.tx_count += 1;
        self.block_number += 1;
        let tx_hash = keccak256(format!("simulated-tx-{}", self.tx_count));
        (tx_hash, self.block_number)
    }
}

/// In-memory Controller simulation.
pub struct SimulatedLedger {
    network: NetworkConfig,
    identity: Arc<SigningIdentity>,
    settlement_timeout: Duration,
    settle_delay: Duration,
    state: Mutex<ChainState>,
    confirm_submissions: AtomicU64,
}

impl SimulatedLedger {
    pub fn new(
        network: NetworkConfig,
        identity: Arc<SigningIdentity>,
        settlement_timeout: Duration,
    ) -> Self {
        Self {
            network,
            identity,
            settlement_timeout,
            settle_delay: Duration::ZERO,
            state: Mutex::new(ChainState {
                next_session: 1,
                next_token_id: 1,
                ..ChainState::default()
            }),
            confirm_submissions: AtomicU64::new(0),
        }
    }

    /// Delay every settlement by `delay`, e.g. to exercise timeouts.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Number of `confirm` calls submitted so far, including rejected ones.
    pub fn confirm_submissions(&self) -> u64 {
        self.confirm_submissions.load(Ordering::SeqCst)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn settle(&self, receipt: SettlementReceipt) -> Result<SettlementReceipt, LedgerError> {
        let delay = self.settle_delay;
        wait_settled(self.settlement_timeout, async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(receipt)
        })
        .await
    }

    fn execute_upload(&self, document_id: &str) -> SettlementReceipt {
        let mut state = self.state();
        let (tx_hash, block_number) = state.next_tx();

        let session = U256::from(state.next_session);
        state.next_session += 1;
        state.sessions.insert(
            session,
            SessionRecord {
                document_id: document_id.to_string(),
                consumed: false,
            },
        );

        let event = UploadData {
            docId: document_id.to_string(),
            sessionId: session,
        };

        SettlementReceipt {
            tx_hash,
            block_number,
            success: true,
            logs: vec![controller_log(&event)],
        }
    }

    fn execute_confirm(
        &self,
        sender: Address,
        request: &SettlementRequest,
    ) -> Result<SettlementReceipt, LedgerError> {
        let mut state = self.state();

        let session = request.session.as_u256();
        let rejected = |reason: SessionRejection| LedgerError::SessionRejected {
            session: request.session.to_string(),
            reason,
        };
        let record = state
            .sessions
            .get_mut(&session)
            .ok_or_else(|| rejected(SessionRejection::Unknown))?;
        if record.consumed {
            return Err(rejected(SessionRejection::Consumed));
        }
        if record.document_id != request.document_id {
            return Err(rejected(SessionRejection::DocumentMismatch));
        }
        record.consumed = true;

        let (tx_hash, block_number) = state.next_tx();
        let token_id = U256::from(state.next_token_id);
        state.next_token_id += 1;
        state.asset_owners.insert(token_id, sender);

        let reward = reward_for_tier(request.tier);
        *state.reward_balances.entry(sender).or_default() += reward;

        let minted = GeneNFTMinted {
            owner: sender,
            tokenId: token_id,
        };
        let rewarded = PCSPRewarded {
            user: sender,
            amount: reward,
        };

        Ok(SettlementReceipt {
            tx_hash,
            block_number,
            success: true,
            logs: vec![controller_log(&minted), controller_log(&rewarded)],
        })
    }
}

fn controller_log<E: SolEvent>(event: &E) -> Log {
    Log {
        address: SIMULATED_CONTROLLER,
        data: event.encode_log_data(),
    }
}

#[async_trait]
impl LedgerGateway for SimulatedLedger {
    async fn open_session(&self, document_id: &str) -> Result<SessionId, LedgerError> {
        self.identity.authorize(self.network.chain_id)?;
        let receipt = self.execute_upload(document_id);
        self.settle(receipt).await?.session_opened(SIMULATED_CONTROLLER)
    }

    async fn confirm_and_settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, LedgerError> {
        let auth = self.identity.authorize(self.network.chain_id)?;
        self.confirm_submissions.fetch_add(1, Ordering::SeqCst);
        let receipt = self.execute_confirm(auth.sender, request)?;
        self.settle(receipt)
            .await?
            .settlement_outcome(SIMULATED_CONTROLLER)
    }

    async fn holdings(&self, owner: &str) -> Result<LedgerHoldings, LedgerError> {
        let addr: Address = owner
            .parse()
            .map_err(|e: alloy::hex::FromHexError| LedgerError::InvalidAddress(e.to_string()))?;

        let state = self.state();
        let asset_count = state
            .asset_owners
            .values()
            .filter(|holder| **holder == addr)
            .count();
        let reward = state.reward_balances.get(&addr).copied().unwrap_or_default();

        Ok(LedgerHoldings {
            address: addr.to_checksum(None),
            network: self.network.name.clone(),
            chain_id: self.network.chain_id,
            native_balance_raw: "0".to_string(),
            asset_count: asset_count.to_string(),
            reward_balance_raw: reward.to_string(),
            reward_balance: format_units(reward, PCSP_DECIMALS),
        })
    }

    async fn asset_owner(&self, token_id: U256) -> Result<String, LedgerError> {
        self.state()
            .asset_owners
            .get(&token_id)
            .map(|owner| owner.to_checksum(None))
            .ok_or_else(|| LedgerError::Query(format!("GeneNFT {token_id} does not exist")))
    }

    fn sender_address(&self) -> String {
        self.identity.address()
    }

    fn network(&self) -> &NetworkConfig {
        &self.network
    }
}
