// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ECIES primitives: secp256k1 ECDH, HKDF-SHA256, ChaCha20-Poly1305.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use k256::{
    ecdh::{diffie_hellman, EphemeralSecret, SharedSecret},
    elliptic_curve::sec1::ToEncodedPoint,
    PublicKey, SecretKey,
};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use super::EnclaveError;

/// Length of a compressed SEC1 secp256k1 point.
pub const PUBLIC_KEY_LEN: usize = 33;

/// ChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 12;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// Scheme identifier advertised next to the enclave public key.
pub const SCHEME: &str = "ecies-secp256k1-hkdf-sha256-chacha20poly1305";

/// HKDF info string; changing it invalidates every outstanding ciphertext.
const KDF_INFO: &[u8] = b"genomic-tee-ecies-v1";

/// Encode a public key as compressed SEC1 bytes.
pub fn encode_public_key(public_key: &PublicKey) -> Vec<u8> {
    public_key.to_encoded_point(true).as_bytes().to_vec()
}

/// Parse a compressed or uncompressed SEC1 public key.
pub fn decode_public_key(bytes: &[u8]) -> Result<PublicKey, EnclaveError> {
    PublicKey::from_sec1_bytes(bytes).map_err(|e| EnclaveError::InvalidPublicKey(e.to_string()))
}

/// Encrypt `plaintext` so that only the holder of `recipient`'s secret can open it.
pub fn encrypt(recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, EnclaveError> {
    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let ephemeral_public = encode_public_key(&ephemeral.public_key());
    let shared = ephemeral.diffie_hellman(recipient);

    let cipher = derive_cipher(&shared, &ephemeral_public)
        .map_err(EnclaveError::EncryptionFailed)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| EnclaveError::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(PUBLIC_KEY_LEN + NONCE_LEN + sealed.len());
    out.extend_from_slice(&ephemeral_public);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open a ciphertext produced by [`encrypt`] with the recipient's secret key.
pub fn decrypt(secret: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>, EnclaveError> {
    if ciphertext.len() < PUBLIC_KEY_LEN + NONCE_LEN + TAG_LEN {
        return Err(EnclaveError::DecryptionFailed(format!(
            "ciphertext too short ({} bytes)",
            ciphertext.len()
        )));
    }

    let (ephemeral_public, rest) = ciphertext.split_at(PUBLIC_KEY_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    let ephemeral = PublicKey::from_sec1_bytes(ephemeral_public)
        .map_err(|e| EnclaveError::DecryptionFailed(format!("invalid ephemeral key: {e}")))?;
    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());

    let cipher =
        derive_cipher(&shared, ephemeral_public).map_err(EnclaveError::DecryptionFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| EnclaveError::DecryptionFailed("authentication tag mismatch".to_string()))
}

fn derive_cipher(
    shared: &SharedSecret,
    ephemeral_public: &[u8],
) -> Result<ChaCha20Poly1305, String> {
    let hk = Hkdf::<Sha256>::new(Some(ephemeral_public), shared.raw_secret_bytes().as_slice());
    let mut key = [0u8; 32];
    hk.expand(KDF_INFO, &mut key).map_err(|e| e.to_string())?;
    ChaCha20Poly1305::new_from_slice(&key).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext() {
        let secret = SecretKey::random(&mut OsRng);
        let ciphertext = encrypt(&secret.public_key(), b"high risk").unwrap();
        assert_eq!(decrypt(&secret, &ciphertext).unwrap(), b"high risk");
    }

    #[test]
    fn encryption_is_randomized() {
        let secret = SecretKey::random(&mut OsRng);
        let a = encrypt(&secret.public_key(), b"low risk").unwrap();
        let b = encrypt(&secret.public_key(), b"low risk").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn ciphertext_layout_has_expected_overhead() {
        let secret = SecretKey::random(&mut OsRng);
        let ciphertext = encrypt(&secret.public_key(), b"abc").unwrap();
        assert_eq!(ciphertext.len(), PUBLIC_KEY_LEN + NONCE_LEN + 3 + TAG_LEN);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let intended = SecretKey::random(&mut OsRng);
        let other = SecretKey::random(&mut OsRng);
        let ciphertext = encrypt(&intended.public_key(), b"high risk").unwrap();
        assert!(matches!(
            decrypt(&other, &ciphertext),
            Err(EnclaveError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let secret = SecretKey::random(&mut OsRng);
        let mut ciphertext = encrypt(&secret.public_key(), b"slightly high risk").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;
        assert!(matches!(
            decrypt(&secret, &ciphertext),
            Err(EnclaveError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let secret = SecretKey::random(&mut OsRng);
        assert!(matches!(
            decrypt(&secret, &[0u8; 10]),
            Err(EnclaveError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn public_key_round_trips_through_sec1() {
        let secret = SecretKey::random(&mut OsRng);
        let encoded = encode_public_key(&secret.public_key());
        assert_eq!(encoded.len(), PUBLIC_KEY_LEN);
        assert_eq!(decode_public_key(&encoded).unwrap(), secret.public_key());
        assert!(decode_public_key(&[0x02; 5]).is_err());
    }
}

#[cfg(test)]
mod proptest_ecies {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Decryption with the recipient key recovers any plaintext.
        #[test]
        fn decrypt_inverts_encrypt(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let secret = SecretKey::random(&mut OsRng);
            let ciphertext = encrypt(&secret.public_key(), &plaintext).unwrap();
            prop_assert_eq!(ciphertext.len(), PUBLIC_KEY_LEN + NONCE_LEN + plaintext.len() + TAG_LEN);
            prop_assert_eq!(decrypt(&secret, &ciphertext).unwrap(), plaintext);
        }
    }
}
