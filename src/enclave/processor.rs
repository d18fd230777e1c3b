// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The enclave processor: key custody, decryption and classification.

use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use super::{ecies, risk, EnclaveError, RiskTier};

const SELF_TEST_REPORT: &str = "low risk";
const SELF_TEST_TIER: RiskTier = RiskTier::Low;

/// Trust-boundary processor holding the decryption key.
///
/// The key pair is generated once per instance. There is no accessor for the
/// secret half and `Debug` only shows the public key.
pub struct Enclave {
    secret: SecretKey,
    public: PublicKey,
}

impl Enclave {
    /// Generate a fresh key pair.
    pub fn new() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Compressed SEC1 public key (33 bytes).
    pub fn public_key(&self) -> Vec<u8> {
        ecies::encode_public_key(&self.public)
    }

    /// Hex-encoded compressed public key, as served to clients.
    pub fn public_key_hex(&self) -> String {
        alloy::hex::encode(self.public_key())
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, EnclaveError> {
        ecies::decrypt(&self.secret, ciphertext)
    }

    pub fn classify(&self, plaintext: &[u8]) -> Result<RiskTier, EnclaveError> {
        risk::classify(plaintext)
    }

    /// Decrypt and classify in one step; the plaintext never leaves this call.
    pub fn evaluate(&self, ciphertext: &[u8]) -> Result<RiskTier, EnclaveError> {
        let plaintext = self.decrypt(ciphertext)?;
        self.classify(&plaintext)
    }

    /// Encrypt a known report to the served public key and evaluate it.
    ///
    /// Fails if the public half no longer opens with the secret half or if
    /// classification drifted.
    pub fn self_test(&self) -> Result<(), EnclaveError> {
        self.self_test_against(&self.public)
    }

    fn self_test_against(&self, recipient: &PublicKey) -> Result<(), EnclaveError> {
        let ciphertext = ecies::encrypt(recipient, SELF_TEST_REPORT.as_bytes())?;
        match self.evaluate(&ciphertext)? {
            SELF_TEST_TIER => Ok(()),
            other => Err(EnclaveError::SelfTestMismatch(other)),
        }
    }
}

impl Default for Enclave {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Enclave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enclave")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enclave::TeeEncoder;

    #[test]
    fn evaluates_reports_encrypted_to_its_public_key() {
        let enclave = Enclave::new();
        let encoder = TeeEncoder::from_hex(&enclave.public_key_hex()).unwrap();

        let cases = [
            ("extremely high risk", RiskTier::ExtremelyHigh),
            ("high risk", RiskTier::High),
            ("slightly high risk", RiskTier::SlightlyHigh),
            ("low risk", RiskTier::Low),
        ];
        for (report, expected) in cases {
            let ciphertext = encoder.encrypt(report.as_bytes()).unwrap();
            assert_eq!(enclave.evaluate(&ciphertext).unwrap(), expected, "{report}");
        }
    }

    #[test]
    fn invalid_report_is_rejected() {
        let enclave = Enclave::new();
        let encoder = TeeEncoder::new(&enclave.public_key()).unwrap();
        let ciphertext = encoder.encrypt(b"invalid").unwrap();
        assert!(matches!(
            enclave.evaluate(&ciphertext),
            Err(EnclaveError::Unclassifiable)
        ));
    }

    #[test]
    fn other_enclave_cannot_decrypt() {
        let enclave = Enclave::new();
        let stranger = Enclave::new();
        let encoder = TeeEncoder::new(&enclave.public_key()).unwrap();
        let ciphertext = encoder.encrypt(b"low risk").unwrap();
        assert!(matches!(
            stranger.decrypt(&ciphertext),
            Err(EnclaveError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn self_test_passes_with_its_own_key() {
        assert!(Enclave::new().self_test().is_ok());
    }

    #[test]
    fn self_test_fails_when_the_key_halves_disagree() {
        let enclave = Enclave::new();
        let stranger = Enclave::new();
        assert!(matches!(
            enclave.self_test_against(&stranger.public),
            Err(EnclaveError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn each_instance_has_its_own_key() {
        assert_ne!(Enclave::new().public_key(), Enclave::new().public_key());
    }

    #[test]
    fn debug_output_shows_only_public_key() {
        let enclave = Enclave::new();
        let rendered = format!("{enclave:?}");
        assert!(rendered.contains(&enclave.public_key_hex()));
        assert!(!rendered.contains("secret"));
    }
}
