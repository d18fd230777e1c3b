// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Settlement receipts and event extraction.
//!
//! Receipt logs are heterogeneous. Only logs emitted by the Controller
//! address are considered. Each one's first topic is matched against the
//! Controller event signatures we understand; recognized logs must decode,
//! unrecognized logs are skipped.

use std::future::Future;
use std::time::Duration;

use alloy::{
    primitives::{Address, Log, B256},
    sol_types::SolEvent,
};
use chrono::Utc;

use super::contracts::IController::{GeneNFTMinted, PCSPRewarded, UploadData};
use super::gateway::LedgerError;
use super::types::{
    format_units, AssetIssued, RewardCredited, SessionId, SettlementOutcome, PCSP_DECIMALS,
};

/// Transaction receipt reduced to what settlement needs.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
    pub logs: Vec<Log>,
}

/// A Controller event recognized in a receipt log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    SessionOpened { document_id: String, session: SessionId },
    AssetIssued(AssetIssued),
    RewardCredited(RewardCredited),
}

impl ControllerEvent {
    /// Decode a single log.
    ///
    /// `Ok(None)` for logs that are not Controller events; `Err` when the
    /// signature matches but the payload does not decode.
    pub fn decode(log: &Log) -> Result<Option<Self>, LedgerError> {
        let Some(topic0) = log.data.topics().first() else {
            return Ok(None);
        };

        if *topic0 == UploadData::SIGNATURE_HASH {
            let event = UploadData::decode_log_data(&log.data).map_err(|e| {
                LedgerError::EventDecode {
                    event: "UploadData",
                    message: e.to_string(),
                }
            })?;
            return Ok(Some(ControllerEvent::SessionOpened {
                document_id: event.docId,
                session: SessionId(event.sessionId),
            }));
        }

        if *topic0 == GeneNFTMinted::SIGNATURE_HASH {
            let event = GeneNFTMinted::decode_log_data(&log.data).map_err(|e| {
                LedgerError::EventDecode {
                    event: "GeneNFTMinted",
                    message: e.to_string(),
                }
            })?;
            return Ok(Some(ControllerEvent::AssetIssued(AssetIssued {
                token_id: event.tokenId.to_string(),
                owner: event.owner.to_checksum(None),
            })));
        }

        if *topic0 == PCSPRewarded::SIGNATURE_HASH {
            let event = PCSPRewarded::decode_log_data(&log.data).map_err(|e| {
                LedgerError::EventDecode {
                    event: "PCSPRewarded",
                    message: e.to_string(),
                }
            })?;
            return Ok(Some(ControllerEvent::RewardCredited(RewardCredited {
                recipient: event.user.to_checksum(None),
                amount_raw: event.amount.to_string(),
                amount: format_units(event.amount, PCSP_DECIMALS),
            })));
        }

        Ok(None)
    }
}

impl SettlementReceipt {
    pub fn tx_hash_hex(&self) -> String {
        format!("{:?}", self.tx_hash)
    }

    fn ensure_success(&self) -> Result<(), LedgerError> {
        if self.success {
            Ok(())
        } else {
            Err(LedgerError::Reverted {
                tx_hash: self.tx_hash_hex(),
            })
        }
    }

    /// Decode every recognized event emitted by `controller`, in log order.
    pub fn events(&self, controller: Address) -> Result<Vec<ControllerEvent>, LedgerError> {
        let mut events = Vec::new();
        for log in self.logs.iter().filter(|log| log.address == controller) {
            if let Some(event) = ControllerEvent::decode(log)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Session minted by an `uploadData` transaction.
    pub fn session_opened(&self, controller: Address) -> Result<SessionId, LedgerError> {
        self.ensure_success()?;
        self.events(controller)?
            .into_iter()
            .find_map(|event| match event {
                ControllerEvent::SessionOpened { session, .. } => Some(session),
                _ => None,
            })
            .ok_or_else(|| LedgerError::MissingEvent {
                tx_hash: self.tx_hash_hex(),
                event: "UploadData",
            })
    }

    /// Collect all issuance and reward events of a `confirm` transaction.
    pub fn settlement_outcome(&self, controller: Address) -> Result<SettlementOutcome, LedgerError> {
        self.ensure_success()?;

        let mut issued_assets = Vec::new();
        let mut rewards = Vec::new();
        for event in self.events(controller)? {
            match event {
                ControllerEvent::AssetIssued(asset) => issued_assets.push(asset),
                ControllerEvent::RewardCredited(reward) => rewards.push(reward),
                ControllerEvent::SessionOpened { .. } => {}
            }
        }

        Ok(SettlementOutcome {
            tx_hash: self.tx_hash_hex(),
            block_number: self.block_number,
            issued_assets,
            rewards,
            settled_at: Utc::now(),
        })
    }
}

/// Wait for a submitted transaction to settle, giving up after `timeout`.
pub async fn wait_settled<F>(timeout: Duration, settlement: F) -> Result<SettlementReceipt, LedgerError>
where
    F: Future<Output = Result<SettlementReceipt, LedgerError>>,
{
    match tokio::time::timeout(timeout, settlement).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout(timeout)),
    }
}
