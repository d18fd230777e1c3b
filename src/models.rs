// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`/`Deserialize` and `ToSchema`
//! for JSON handling and OpenAPI documentation.
//!
//! ## Identifiers on the wire
//!
//! - Content digests are 64 lowercase hex characters (SHA-256 of the ciphertext)
//! - Session ids and token ids are decimal strings, since they are `uint256`
//!   on the ledger

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::SettlementOutcome;
use crate::enclave::RiskTier;
use crate::pipeline::{Confirmation, Submission};

// =============================================================================
// Documents
// =============================================================================

/// Result of uploading an encrypted report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// SHA-256 of the uploaded ciphertext; also the ledger document id
    pub digest: String,
    /// Upload session opened on the ledger
    pub session_id: String,
}

impl From<Submission> for UploadResponse {
    fn from(submission: Submission) -> Self {
        Self {
            digest: submission.digest.to_hex(),
            session_id: submission.session.to_string(),
        }
    }
}

/// Request to classify and settle a previously uploaded report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    /// Digest returned by the upload
    pub digest: String,
    /// Session id returned by the upload
    pub session_id: String,
}

/// Classification and settlement result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmResponse {
    pub digest: String,
    pub session_id: String,
    /// Risk score, 1 (low) to 4 (extremely high)
    pub risk_score: u8,
    pub risk_label: String,
    pub risk_tier: RiskTier,
    pub settlement: SettlementOutcome,
}

impl From<Confirmation> for ConfirmResponse {
    fn from(confirmation: Confirmation) -> Self {
        Self {
            digest: confirmation.digest.to_hex(),
            session_id: confirmation.session.to_string(),
            risk_score: confirmation.tier.score(),
            risk_label: confirmation.tier.label().to_string(),
            risk_tier: confirmation.tier,
            settlement: confirmation.outcome,
        }
    }
}

// =============================================================================
// Enclave
// =============================================================================

/// Key clients encrypt their reports to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicKeyResponse {
    /// Compressed secp256k1 public key, hex-encoded (33 bytes)
    pub public_key: String,
    /// Encryption scheme the enclave accepts
    pub scheme: String,
}

// =============================================================================
// Ledger
// =============================================================================

/// Current owner of an issued GeneNFT.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetOwnerResponse {
    pub token_id: String,
    pub owner: String,
}
