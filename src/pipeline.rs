// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Submission Pipeline
//!
//! Orchestrates the two client-visible operations:
//!
//! 1. **submit**: store the encrypted report, then open a ledger session for it
//! 2. **confirm**: retrieve, decrypt and classify inside the enclave, then
//!    settle the classification on the ledger
//!
//! Stages run strictly in order and the first failure aborts the operation.
//! Every error is tagged with the stage that produced it.
//!
//! ## Partial failures
//!
//! A blob that was stored before `open_session` failed stays in the store.
//! The same bytes map to the same digest, so resubmitting reuses the entry.
//!
//! ## Logging
//!
//! Stage transitions are logged with digests, session ids and transaction
//! hashes only. Plaintext and key material are never logged.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::blockchain::{
    LedgerError, LedgerGateway, RemoteStep, SessionId, SessionRejection, SettlementOutcome,
    SettlementRequest,
};
use crate::enclave::{Enclave, EnclaveError, RiskTier};
use crate::storage::{ContentDigest, ContentStore, StorageError};

/// Proof value the Controller accepts in development deployments.
pub const DEFAULT_SETTLEMENT_PROOF: &str = "0x1234";

/// Supplies the proof artifact attached to a settlement.
///
/// The ledger treats the proof as opaque; producing a real attestation is
/// the collaborator's job.
pub trait ProofSource: Send + Sync {
    fn proof_for(&self, digest: &ContentDigest, tier: RiskTier) -> String;
}

/// A fixed proof value, configured at startup.
#[derive(Debug, Clone)]
pub struct StaticProof(String);

impl StaticProof {
    pub fn new(proof: impl Into<String>) -> Self {
        Self(proof.into())
    }
}

impl Default for StaticProof {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLEMENT_PROOF)
    }
}

impl ProofSource for StaticProof {
    fn proof_for(&self, _digest: &ContentDigest, _tier: RiskTier) -> String {
        self.0.clone()
    }
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Store,
    OpenSession,
    Retrieve,
    Decrypt,
    Classify,
    Settle,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Store => "store",
            PipelineStage::OpenSession => "open_session",
            PipelineStage::Retrieve => "retrieve",
            PipelineStage::Decrypt => "decrypt",
            PipelineStage::Classify => "classify",
            PipelineStage::Settle => "settle",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a pipeline failure, used for API status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    /// The session exists but cannot settle this document again.
    Conflict,
    DecryptionFailed,
    Unclassifiable,
    Remote(RemoteStep),
    Timeout,
}

/// Underlying cause of a pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineFailure {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Enclave(#[from] EnclaveError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A failure tagged with the stage it happened in.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {failure}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub failure: PipelineFailure,
}

impl PipelineError {
    fn at(stage: PipelineStage, failure: impl Into<PipelineFailure>) -> Self {
        Self {
            stage,
            failure: failure.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.failure {
            PipelineFailure::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineFailure::Storage(StorageError::NotFound(_)) => ErrorKind::NotFound,
            PipelineFailure::Storage(StorageError::InvalidDigest(_)) => ErrorKind::InvalidInput,
            PipelineFailure::Enclave(EnclaveError::Unclassifiable) => ErrorKind::Unclassifiable,
            PipelineFailure::Enclave(_) => ErrorKind::DecryptionFailed,
            PipelineFailure::Ledger(e) if e.is_timeout() => ErrorKind::Timeout,
            PipelineFailure::Ledger(e) => match e.session_rejection() {
                Some(SessionRejection::Unknown) => ErrorKind::NotFound,
                Some(SessionRejection::Consumed | SessionRejection::DocumentMismatch) => {
                    ErrorKind::Conflict
                }
                None => ErrorKind::Remote(e.remote_step()),
            },
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub digest: ContentDigest,
    pub session: SessionId,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub digest: ContentDigest,
    pub session: SessionId,
    pub tier: RiskTier,
    pub outcome: SettlementOutcome,
}

/// Ties the content store, enclave and ledger together.
pub struct Pipeline {
    store: Arc<dyn ContentStore>,
    enclave: Arc<Enclave>,
    ledger: Arc<dyn LedgerGateway>,
    proofs: Arc<dyn ProofSource>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        enclave: Arc<Enclave>,
        ledger: Arc<dyn LedgerGateway>,
        proofs: Arc<dyn ProofSource>,
    ) -> Self {
        Self {
            store,
            enclave,
            ledger,
            proofs,
        }
    }

    /// Store an encrypted report and open a ledger session for it.
    pub async fn submit(&self, ciphertext: &[u8]) -> Result<Submission, PipelineError> {
        if ciphertext.is_empty() {
            return Err(PipelineError::at(
                PipelineStage::Store,
                PipelineFailure::InvalidInput("encrypted report is empty".to_string()),
            ));
        }

        let digest = self.store.store(ciphertext);
        info!(digest = %digest, size = ciphertext.len(), "Encrypted report stored");

        let session = self
            .ledger
            .open_session(&digest.to_hex())
            .await
            .map_err(|e| {
                warn!(digest = %digest, error = %e, "Failed to open upload session");
                PipelineError::at(PipelineStage::OpenSession, e)
            })?;

        info!(digest = %digest, session = %session, "Upload session opened");
        Ok(Submission { digest, session })
    }

    /// Classify a stored report inside the enclave and settle the result.
    pub async fn confirm(
        &self,
        digest: &ContentDigest,
        session: SessionId,
    ) -> Result<Confirmation, PipelineError> {
        let ciphertext = self
            .store
            .retrieve(digest)
            .map_err(|e| PipelineError::at(PipelineStage::Retrieve, e))?;

        let plaintext = self
            .enclave
            .decrypt(&ciphertext)
            .map_err(|e| PipelineError::at(PipelineStage::Decrypt, e))?;

        let tier = self
            .enclave
            .classify(&plaintext)
            .map_err(|e| PipelineError::at(PipelineStage::Classify, e))?;
        drop(plaintext);

        info!(digest = %digest, session = %session, risk_score = tier.score(), "Report classified");

        let request = SettlementRequest {
            document_id: digest.to_hex(),
            content_digest: *digest,
            proof: self.proofs.proof_for(digest, tier),
            session,
            tier,
        };

        let outcome = self.ledger.confirm_and_settle(&request).await.map_err(|e| {
            warn!(digest = %digest, session = %session, error = %e, "Settlement failed");
            PipelineError::at(PipelineStage::Settle, e)
        })?;

        info!(
            digest = %digest,
            session = %session,
            tx_hash = %outcome.tx_hash,
            assets = outcome.issued_assets.len(),
            rewards = outcome.rewards.len(),
            "Classification settled"
        );

        Ok(Confirmation {
            digest: *digest,
            session,
            tier,
            outcome,
        })
    }

    /// Compressed enclave public key, hex-encoded.
    pub fn public_key_hex(&self) -> String {
        self.enclave.public_key_hex()
    }

    /// Round-trip a known report through the enclave.
    pub fn check_enclave(&self) -> Result<(), EnclaveError> {
        self.enclave.self_test()
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerGateway> {
        &self.ledger
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }
}
