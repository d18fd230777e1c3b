// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Volatile in-memory content store.
//!
//! Reads share the lock; a store or delete holds it exclusively for the
//! duration of the map mutation only. Nothing here survives a restart.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{ContentDigest, ContentStore, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentDigest, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for InMemoryContentStore {
    fn store(&self, bytes: &[u8]) -> ContentDigest {
        // Hash outside the lock; only the insert needs exclusivity.
        let digest = ContentDigest::of(bytes);
        let owned = bytes.to_vec();

        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(digest, owned);
        digest
    }

    fn retrieve(&self, digest: &ContentDigest) -> StorageResult<Vec<u8>> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        blobs
            .get(digest)
            .cloned()
            .ok_or(StorageError::NotFound(*digest))
    }

    fn delete(&self, digest: &ContentDigest) -> StorageResult<()> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs
            .remove(digest)
            .map(|_| ())
            .ok_or(StorageError::NotFound(*digest))
    }

    fn contains(&self, digest: &ContentDigest) -> bool {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        blobs.contains_key(digest)
    }

    fn len(&self) -> usize {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        blobs.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn store_retrieve_delete_lifecycle() {
        let store = InMemoryContentStore::new();
        let data = b"test gene data".to_vec();

        let digest = store.store(&data);
        assert_eq!(store.retrieve(&digest).unwrap(), data);

        store.delete(&digest).unwrap();
        assert_eq!(
            store.retrieve(&digest).unwrap_err(),
            StorageError::NotFound(digest)
        );
    }

    #[test]
    fn store_is_idempotent_by_content() {
        let store = InMemoryContentStore::new();
        let first = store.store(b"same bytes");
        let second = store.store(b"same bytes");

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_content_gets_distinct_digests() {
        let store = InMemoryContentStore::new();
        let a = store.store(b"alice");
        let b = store.store(b"bob");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_missing_digest_is_not_found() {
        let store = InMemoryContentStore::new();
        let digest = ContentDigest::of(b"never stored");
        assert_eq!(
            store.delete(&digest).unwrap_err(),
            StorageError::NotFound(digest)
        );
    }

    #[test]
    fn delete_twice_reports_not_found_the_second_time() {
        let store = InMemoryContentStore::new();
        let digest = store.store(b"payload");
        store.delete(&digest).unwrap();
        assert!(matches!(
            store.delete(&digest),
            Err(StorageError::NotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn caller_buffers_are_isolated_from_stored_state() {
        let store = InMemoryContentStore::new();
        let mut input = b"original".to_vec();
        let digest = store.store(&input);

        input[0] = b'X';
        let mut retrieved = store.retrieve(&digest).unwrap();
        assert_eq!(retrieved, b"original");

        retrieved[0] = b'Y';
        assert_eq!(store.retrieve(&digest).unwrap(), b"original");
    }

    #[test]
    fn empty_blob_round_trips() {
        let store = InMemoryContentStore::new();
        let digest = store.store(&[]);
        assert!(store.contains(&digest));
        assert!(store.retrieve(&digest).unwrap().is_empty());
    }

    #[test]
    fn concurrent_stores_and_reads_stay_consistent() {
        let store = Arc::new(InMemoryContentStore::new());

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let payload = vec![i; 64];
                    let digest = store.store(&payload);
                    for _ in 0..50 {
                        assert_eq!(store.retrieve(&digest).unwrap(), payload);
                    }
                    digest
                })
            })
            .collect();

        let digests: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(store.len(), 8);
        for (i, digest) in digests.iter().enumerate() {
            assert_eq!(store.retrieve(digest).unwrap(), vec![i as u8; 64]);
        }
    }
}
