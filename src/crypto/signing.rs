// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sessionless message signing over secp256k1.
//!
//! Messages are signed as raw UTF-8 strings: the message is hashed with
//! SHA-256 and signed with ECDSA. Signatures travel as the 128-character hex
//! encoding of the compact `r || s` form; public keys travel as the
//! 66-character hex encoding of the compressed SEC1 point.
//!
//! Callers own canonical message construction (see [`super::canonical`]);
//! nothing in this module re-encodes or reorders the message.

use std::sync::Arc;

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError};

/// Errors produced while signing.
///
/// Verification never errors: a malformed signature or key simply fails to
/// verify.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signing key unavailable: {0}")]
    KeySourceUnavailable(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// A secp256k1 key pair in its stored (hex) form.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SigningKeys {
    /// 32-byte scalar, hex encoded.
    pub private_key: String,
    /// Compressed SEC1 public key, hex encoded.
    pub pub_key: String,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("private_key", &"<redacted>")
            .field("pub_key", &self.pub_key)
            .finish()
    }
}

impl SigningKeys {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let pub_key = encode_public_key(signing_key.verifying_key());

        Self {
            private_key: hex::encode(signing_key.to_bytes()),
            pub_key,
        }
    }

    /// Sign `message` with this key pair.
    pub fn sign(&self, message: &str) -> Result<String, SignatureError> {
        let bytes = hex::decode(self.private_key.trim())
            .map_err(|e| SignatureError::InvalidPrivateKey(format!("invalid hex: {e}")))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;

        let signature: Signature = signing_key.sign(message.as_bytes());
        Ok(hex::encode(signature.to_bytes()))
    }
}

/// Verify `signature` over `message` against the hex `pub_key`.
///
/// Returns `false` for malformed hex, malformed signatures, malformed keys and
/// mismatches alike. High-S signatures from other implementations are
/// normalized before verification.
pub fn verify(signature: &str, message: &str, pub_key: &str) -> bool {
    let Ok(signature_bytes) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        return false;
    };
    let signature = signature.normalize_s().unwrap_or(signature);

    let Ok(key_bytes) = hex::decode(pub_key.trim()) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key_bytes) else {
        return false;
    };

    verifying_key.verify(message.as_bytes(), &signature).is_ok()
}

fn encode_public_key(verifying_key: &VerifyingKey) -> String {
    hex::encode(verifying_key.to_encoded_point(true).as_bytes())
}

/// Signing capability injected into everything that emits signed envelopes.
///
/// Implementations fetch key material on demand; holders of a
/// `MessageSigner` never see the private key.
pub trait MessageSigner: Send + Sync {
    /// Sign a canonical message.
    fn sign(&self, message: &str) -> Result<String, SignatureError>;

    /// The public half of the signing key.
    fn public_key(&self) -> Result<String, SignatureError>;
}

/// [`MessageSigner`] backed by the key-value store's saved signing keys.
#[derive(Clone)]
pub struct StoreSigner {
    store: Arc<dyn KeyValueStore>,
}

impl StoreSigner {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn keys(&self) -> Result<SigningKeys, SignatureError> {
        self.store
            .get_signing_keys()
            .map_err(|e| SignatureError::KeySourceUnavailable(e.to_string()))?
            .ok_or_else(|| SignatureError::KeySourceUnavailable("no signing keys saved".to_string()))
    }
}

impl MessageSigner for StoreSigner {
    fn sign(&self, message: &str) -> Result<String, SignatureError> {
        self.keys()?.sign(message)
    }

    fn public_key(&self) -> Result<String, SignatureError> {
        Ok(self.keys()?.pub_key)
    }
}

/// Load the node's signing keys, generating and saving a pair on first start.
pub fn ensure_signing_keys(store: &dyn KeyValueStore) -> Result<SigningKeys, StorageError> {
    if let Some(keys) = store.get_signing_keys()? {
        return Ok(keys);
    }

    let keys = SigningKeys::generate();
    store.save_signing_keys(&keys)?;
    tracing::info!(pub_key = %keys.pub_key, "Generated node signing keys");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn sign_then_verify_round_trips() {
        let keys = SigningKeys::generate();
        let message = "1700000000000abc-123";
        let signature = keys.sign(message).unwrap();

        assert_eq!(signature.len(), 128);
        assert_eq!(keys.pub_key.len(), 66);
        assert!(verify(&signature, message, &keys.pub_key));
    }

    #[test]
    fn single_character_mutation_fails_verification() {
        let keys = SigningKeys::generate();
        let message = "1700000000000010203040506";
        let signature = keys.sign(message).unwrap();

        for i in 0..message.len() {
            let mut mutated: Vec<char> = message.chars().collect();
            mutated[i] = if mutated[i] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();
            assert!(!verify(&signature, &mutated, &keys.pub_key), "mutation at {i}");
        }
    }

    #[test]
    fn substituted_key_fails_verification() {
        let keys = SigningKeys::generate();
        let other = SigningKeys::generate();
        let signature = keys.sign("hello").unwrap();

        assert!(!verify(&signature, "hello", &other.pub_key));
    }

    #[test]
    fn malformed_inputs_verify_false() {
        let keys = SigningKeys::generate();
        let signature = keys.sign("hello").unwrap();

        assert!(!verify("not-hex", "hello", &keys.pub_key));
        assert!(!verify("abcd", "hello", &keys.pub_key));
        assert!(!verify(&signature, "hello", "02deadbeef"));
        assert!(!verify(&signature, "hello", ""));
    }

    #[test]
    fn signatures_differ_with_timestamp() {
        let keys = SigningKeys::generate();
        let a = keys.sign("1700000000000pub").unwrap();
        let b = keys.sign("1700000000001pub").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn debug_redacts_private_key() {
        let keys = SigningKeys::generate();
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains(&keys.private_key));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn store_signer_without_keys_is_unavailable() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let signer = StoreSigner::new(store);

        assert!(matches!(
            signer.sign("hello"),
            Err(SignatureError::KeySourceUnavailable(_))
        ));
    }

    #[test]
    fn ensure_signing_keys_is_idempotent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = ensure_signing_keys(store.as_ref()).unwrap();
        let second = ensure_signing_keys(store.as_ref()).unwrap();
        assert_eq!(first, second);

        let signer = StoreSigner::new(store);
        let signature = signer.sign("hello").unwrap();
        assert_eq!(signer.public_key().unwrap(), first.pub_key);
        assert!(verify(&signature, "hello", &first.pub_key));
    }
}
