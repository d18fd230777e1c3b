// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service signing identity.
//!
//! Holds the settlement key for the lifetime of the process and hands out
//! one-shot, chain-bound authorization contexts. The key itself is never
//! serialized, logged or returned.

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::{local::PrivateKeySigner, Signer},
};
use k256::SecretKey;

use super::gateway::LedgerError;

/// Per-transaction signing context.
///
/// Consumed by value when a transaction is submitted. The wallet's signer is
/// pinned to `chain_id`, so signatures cannot be replayed on another network.
pub struct AuthorizationContext {
    pub chain_id: u64,
    pub sender: Address,
    pub wallet: EthereumWallet,
}

impl std::fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("chain_id", &self.chain_id)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Private signing key bound to a single chain.
pub struct SigningIdentity {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl SigningIdentity {
    /// Create from a hex-encoded private key (with or without `0x`).
    pub fn from_hex(private_key_hex: &str, chain_id: u64) -> Result<Self, LedgerError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))?;

        Self::from_signer(signer, chain_id)
    }

    /// Create from a PEM-encoded private key (SEC1 or PKCS#8).
    pub fn from_pem(pem_bytes: &[u8], chain_id: u64) -> Result<Self, LedgerError> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key, chain_id)
    }

    /// Generate a throwaway identity. Only meaningful against the simulated ledger.
    pub fn random(chain_id: u64) -> Result<Self, LedgerError> {
        Self::from_signer(PrivateKeySigner::random(), chain_id)
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Result<Self, LedgerError> {
        if chain_id == 0 {
            return Err(LedgerError::Authorization(
                "chain id must be non-zero".to_string(),
            ));
        }
        Ok(Self { signer, chain_id })
    }

    /// EIP-55 checksummed address.
    pub fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Produce a signing context for one transaction on `chain_id`.
    ///
    /// Fails when `chain_id` differs from the chain this identity is bound to.
    pub fn authorize(&self, chain_id: u64) -> Result<AuthorizationContext, LedgerError> {
        if chain_id != self.chain_id {
            return Err(LedgerError::Authorization(format!(
                "identity is bound to chain {}, refusing to sign for chain {}",
                self.chain_id, chain_id
            )));
        }

        let mut signer = self.signer.clone();
        signer.set_chain_id(Some(self.chain_id));
        let sender = signer.address();

        Ok(AuthorizationContext {
            chain_id: self.chain_id,
            sender,
            wallet: EthereumWallet::from(signer),
        })
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, LedgerError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

#[cfg(test)]
mod tests {
    use k256::pkcs8::{EncodePrivateKey, LineEnding};

    use super::*;

    // Well-known development key (hardhat account #0)
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn hex_key_derives_checksummed_address() {
        let identity = SigningIdentity::from_hex(DEV_KEY, 9999).unwrap();
        assert_eq!(identity.address(), DEV_ADDRESS);

        let prefixed = SigningIdentity::from_hex(&format!("0x{DEV_KEY}"), 9999).unwrap();
        assert_eq!(prefixed.address(), DEV_ADDRESS);
    }

    #[test]
    fn invalid_keys_are_rejected() {
        assert!(matches!(
            SigningIdentity::from_hex("zz", 9999),
            Err(LedgerError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            SigningIdentity::from_hex("00", 9999),
            Err(LedgerError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            SigningIdentity::from_pem(b"not a pem", 9999),
            Err(LedgerError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn pkcs8_pem_matches_raw_key() {
        let key_bytes = alloy::hex::decode(DEV_KEY).unwrap();
        let secret = SecretKey::from_slice(&key_bytes).unwrap();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();

        let identity = SigningIdentity::from_pem(pem.as_bytes(), 9999).unwrap();
        assert_eq!(identity.address(), DEV_ADDRESS);
    }

    #[test]
    fn authorization_is_bound_to_chain() {
        let identity = SigningIdentity::from_hex(DEV_KEY, 9999).unwrap();

        let ctx = identity.authorize(9999).unwrap();
        assert_eq!(ctx.chain_id, 9999);
        assert_eq!(ctx.sender.to_checksum(None), DEV_ADDRESS);

        assert!(matches!(
            identity.authorize(1),
            Err(LedgerError::Authorization(_))
        ));
    }

    #[test]
    fn zero_chain_id_is_rejected() {
        assert!(SigningIdentity::from_hex(DEV_KEY, 0).is_err());
    }

    #[test]
    fn debug_output_never_contains_the_key() {
        let identity = SigningIdentity::from_hex(DEV_KEY, 9999).unwrap();
        let rendered = format!("{identity:?}");
        assert!(!rendered.to_lowercase().contains(DEV_KEY));
        assert!(rendered.contains(DEV_ADDRESS));
    }
}
