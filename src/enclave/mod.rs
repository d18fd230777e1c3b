// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Trust-Boundary Processor
//!
//! The enclave owns a secp256k1 key pair generated at startup. Clients fetch
//! the public half, encrypt their genomic report to it, and only this process
//! can open the result. The private half never leaves [`Enclave`].
//!
//! ## Scheme
//!
//! ECIES over secp256k1:
//!
//! ```text
//! ephemeral_pubkey (33, compressed SEC1) || nonce (12) || ChaCha20-Poly1305(ciphertext || tag)
//! ```
//!
//! The symmetric key is HKDF-SHA256 over the ECDH shared secret, salted with
//! the ephemeral public key. A fresh ephemeral key and nonce per message make
//! encryption randomized; the AEAD tag rejects tampered ciphertext.

pub mod ecies;
pub mod encoder;
pub mod processor;
pub mod risk;

pub use encoder::TeeEncoder;
pub use processor::Enclave;
pub use risk::RiskTier;

/// Errors raised inside the trust boundary.
#[derive(Debug, thiserror::Error)]
pub enum EnclaveError {
    /// Ciphertext is malformed, was tampered with, or targets another key
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Decrypted content matches no known risk label
    #[error("Content does not match any recognized risk label")]
    Unclassifiable,

    #[error("Invalid enclave public key: {0}")]
    InvalidPublicKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The startup report classified to an unexpected tier
    #[error("Self-test classified the known report as {0:?}")]
    SelfTestMismatch(RiskTier),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
