// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SHA-256 content digests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::StorageError;

/// SHA-256 digest of a stored blob.
///
/// Rendered as 64 lowercase hex characters. Parsing accepts an optional
/// `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Compute the digest of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        alloy::hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_part.len() != 64 {
            return Err(StorageError::InvalidDigest(format!(
                "expected 64 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; 32];
        alloy::hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| StorageError::InvalidDigest(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_sha256() {
        let digest = ContentDigest::of(b"abc");
        assert_eq!(
            digest.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn parse_accepts_prefixed_and_bare_hex() {
        let digest = ContentDigest::of(b"gene");
        let bare: ContentDigest = digest.to_hex().parse().unwrap();
        let prefixed: ContentDigest = format!("0x{}", digest.to_hex()).parse().unwrap();
        assert_eq!(bare, digest);
        assert_eq!(prefixed, digest);
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!(matches!(
            "abcd".parse::<ContentDigest>(),
            Err(StorageError::InvalidDigest(_))
        ));
        let not_hex = "z".repeat(64);
        assert!(matches!(
            not_hex.parse::<ContentDigest>(),
            Err(StorageError::InvalidDigest(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let digest = ContentDigest::of(b"abc");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
