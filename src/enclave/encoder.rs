// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side encoder for submitting reports to the enclave.
//!
//! Data owners fetch the enclave public key from `/v1/tee/public-key` and use
//! this encoder to produce the upload body.

use std::path::Path;

use k256::PublicKey;

use super::{ecies, EnclaveError};

#[derive(Debug, Clone)]
pub struct TeeEncoder {
    enclave_key: PublicKey,
}

impl TeeEncoder {
    /// Build from SEC1-encoded public key bytes.
    pub fn new(public_key: &[u8]) -> Result<Self, EnclaveError> {
        Ok(Self {
            enclave_key: ecies::decode_public_key(public_key)?,
        })
    }

    /// Build from the hex string served by the API (optional `0x` prefix).
    pub fn from_hex(public_key_hex: &str) -> Result<Self, EnclaveError> {
        let bytes = alloy::hex::decode(public_key_hex.trim())
            .map_err(|e| EnclaveError::InvalidPublicKey(e.to_string()))?;
        Self::new(&bytes)
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, EnclaveError> {
        ecies::encrypt(&self.enclave_key, data)
    }

    /// Read a report from disk and encrypt it. Missing or empty files are errors.
    pub fn encrypt_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, EnclaveError> {
        let data = std::fs::read(path.as_ref())?;
        if data.is_empty() {
            return Err(EnclaveError::EncryptionFailed(format!(
                "report file is empty: {}",
                path.as_ref().display()
            )));
        }
        self.encrypt(&data)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::enclave::{Enclave, RiskTier};

    #[test]
    fn rejects_malformed_public_keys() {
        assert!(matches!(
            TeeEncoder::from_hex("not hex"),
            Err(EnclaveError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            TeeEncoder::from_hex("0x0203"),
            Err(EnclaveError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn accepts_prefixed_hex() {
        let enclave = Enclave::new();
        let prefixed = format!("0x{}", enclave.public_key_hex());
        assert!(TeeEncoder::from_hex(&prefixed).is_ok());
    }

    #[test]
    fn encrypts_report_files() {
        let enclave = Enclave::new();
        let encoder = TeeEncoder::new(&enclave.public_key()).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Slightly High Risk").unwrap();

        let ciphertext = encoder.encrypt_file(file.path()).unwrap();
        assert_eq!(enclave.evaluate(&ciphertext).unwrap(), RiskTier::SlightlyHigh);
    }

    #[test]
    fn empty_and_missing_files_are_rejected() {
        let enclave = Enclave::new();
        let encoder = TeeEncoder::new(&enclave.public_key()).unwrap();

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            encoder.encrypt_file(empty.path()),
            Err(EnclaveError::EncryptionFailed(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            encoder.encrypt_file(dir.path().join("missing.txt")),
            Err(EnclaveError::Io(_))
        ));
    }
}
