// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the LIFE network Controller contract.
//!
//! This module provides functionality for:
//! - Opening upload sessions (`uploadData`)
//! - Confirming classifications and collecting the issued GeneNFT and PCSP reward
//! - Querying asset and reward holdings
//!
//! Transactions are signed with a [`SigningIdentity`] bound to a single
//! chain and every settlement wait is bounded.

pub mod contracts;
pub mod gateway;
pub mod receipt;
pub mod rpc;
pub mod signing;
pub mod simulated;
pub mod types;

pub use gateway::{LedgerError, LedgerGateway, RemoteStep, SessionRejection};
pub use receipt::{wait_settled, ControllerEvent, SettlementReceipt};
pub use rpc::RpcLedgerGateway;
pub use signing::{AuthorizationContext, SigningIdentity};
pub use simulated::SimulatedLedger;
pub use types::*;
