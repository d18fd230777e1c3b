// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger gateway seam.
//!
//! The pipeline only talks to the ledger through [`LedgerGateway`], so the
//! RPC-backed implementation and the in-process simulation are
//! interchangeable.

use std::fmt;
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;

use super::types::{LedgerHoldings, NetworkConfig, SessionId, SettlementOutcome, SettlementRequest};

/// Remote operations the service performs against the ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Open an upload session for `document_id` and wait for it to settle.
    async fn open_session(&self, document_id: &str) -> Result<SessionId, LedgerError>;

    /// Submit a classification for a session, wait for settlement and
    /// extract every recognized event.
    ///
    /// Must be called at most once per session; the contract rejects reuse.
    async fn confirm_and_settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, LedgerError>;

    /// Native, asset and reward holdings of `owner`.
    async fn holdings(&self, owner: &str) -> Result<LedgerHoldings, LedgerError>;

    /// Current owner of an issued asset.
    async fn asset_owner(&self, token_id: U256) -> Result<String, LedgerError>;

    /// Address transactions are signed with.
    fn sender_address(&self) -> String;

    fn network(&self) -> &NetworkConfig;
}

/// Sub-stage of a remote call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStep {
    Authorize,
    Submit,
    Settle,
    Extract,
    Query,
    Input,
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteStep::Authorize => "authorize",
            RemoteStep::Submit => "submit",
            RemoteStep::Settle => "settle",
            RemoteStep::Extract => "extract",
            RemoteStep::Query => "query",
            RemoteStep::Input => "input",
        };
        f.write_str(name)
    }
}

/// Why the Controller refused to confirm a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// No session with this id was ever opened.
    Unknown,
    /// The session was already confirmed once.
    Consumed,
    /// The session was opened for a different document.
    DocumentMismatch,
}

impl fmt::Display for SessionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SessionRejection::Unknown => "unknown session",
            SessionRejection::Consumed => "session already confirmed",
            SessionRejection::DocumentMismatch => "session belongs to another document",
        };
        f.write_str(reason)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Settlement failed: {0}")]
    Settlement(String),

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Settlement did not finalize within {0:?}")]
    Timeout(Duration),

    #[error("Transaction {tx_hash} settled without a {event} event")]
    MissingEvent { tx_hash: String, event: &'static str },

    #[error("Failed to decode {event} event: {message}")]
    EventDecode { event: &'static str, message: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Session {session} rejected: {reason}")]
    SessionRejected {
        session: String,
        reason: SessionRejection,
    },
}

impl LedgerError {
    /// Which part of the remote call failed.
    pub fn remote_step(&self) -> RemoteStep {
        match self {
            LedgerError::Authorization(_) | LedgerError::InvalidPrivateKey(_) => {
                RemoteStep::Authorize
            }
            LedgerError::Submission(_) | LedgerError::InvalidRpcUrl(_) => RemoteStep::Submit,
            LedgerError::Settlement(_) | LedgerError::Reverted { .. } | LedgerError::Timeout(_) => {
                RemoteStep::Settle
            }
            LedgerError::MissingEvent { .. } | LedgerError::EventDecode { .. } => {
                RemoteStep::Extract
            }
            LedgerError::Query(_) => RemoteStep::Query,
            LedgerError::InvalidAddress(_)
            | LedgerError::InvalidSession(_)
            | LedgerError::SessionRejected { .. } => RemoteStep::Input,
        }
    }

    /// The reason a confirm was refused, if the ledger refused the session itself.
    pub fn session_rejection(&self) -> Option<SessionRejection> {
        match self {
            LedgerError::SessionRejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LedgerError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_tagged_with_their_remote_step() {
        assert_eq!(
            LedgerError::Authorization("x".into()).remote_step(),
            RemoteStep::Authorize
        );
        assert_eq!(LedgerError::Submission("x".into()).remote_step(), RemoteStep::Submit);
        assert_eq!(
            LedgerError::Reverted { tx_hash: "0x1".into() }.remote_step(),
            RemoteStep::Settle
        );
        assert_eq!(
            LedgerError::MissingEvent { tx_hash: "0x1".into(), event: "UploadData" }.remote_step(),
            RemoteStep::Extract
        );
        assert!(LedgerError::Timeout(Duration::from_secs(1)).is_timeout());
    }

    #[test]
    fn session_rejections_are_caller_errors() {
        let err = LedgerError::SessionRejected {
            session: "7".into(),
            reason: SessionRejection::Consumed,
        };
        assert_eq!(err.remote_step(), RemoteStep::Input);
        assert_eq!(err.session_rejection(), Some(SessionRejection::Consumed));
        assert_eq!(err.to_string(), "Session 7 rejected: session already confirmed");
        assert_eq!(
            LedgerError::Reverted { tx_hash: "0x1".into() }.session_rejection(),
            None
        );
    }
}
