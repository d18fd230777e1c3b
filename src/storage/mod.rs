// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Content Store
//!
//! Content-addressed holder for encrypted genomic blobs. Every blob is keyed
//! by the SHA-256 digest of its bytes, and that digest doubles as the
//! document identifier handed to the ledger.
//!
//! ## Security Model
//!
//! - Only ciphertext ever reaches the store; plaintext exists solely inside
//!   the enclave processor
//! - Blobs are immutable once stored
//! - Storing identical bytes twice yields the same digest and a single entry
//!
//! ## Durability
//!
//! The reference implementation is volatile. Anything that must survive a
//! restart belongs behind another [`ContentStore`] implementation.

pub mod digest;
pub mod memory;

pub use digest::ContentDigest;
pub use memory::InMemoryContentStore;

/// Error type for content store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No blob is stored under the digest
    #[error("Blob not found: {0}")]
    NotFound(ContentDigest),

    /// The supplied digest is not 32 hex-encoded bytes
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Content-addressable storage for encrypted blobs.
///
/// Implementations must hand out independent copies: mutating a buffer after
/// [`store`](ContentStore::store) or a buffer returned by
/// [`retrieve`](ContentStore::retrieve) never changes what is stored.
pub trait ContentStore: Send + Sync {
    /// Store a blob and return its digest. Idempotent by content.
    fn store(&self, bytes: &[u8]) -> ContentDigest;

    /// Retrieve a copy of the blob stored under `digest`.
    fn retrieve(&self, digest: &ContentDigest) -> StorageResult<Vec<u8>>;

    /// Remove the blob stored under `digest`.
    fn delete(&self, digest: &ContentDigest) -> StorageResult<()>;

    /// Whether a blob is stored under `digest`.
    fn contains(&self, digest: &ContentDigest) -> bool;

    /// Number of blobs currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
