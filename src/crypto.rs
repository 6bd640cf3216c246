//! Cryptographic primitives for ByteChain
//!
//! SHA-256 digests, secp256k1 ECDSA over pre-hashed messages, and the base58
//! codec for compact `r || s` signatures.

use crate::error::CryptoError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

pub type Sha256Hash = [u8; 32];

/// Compact signature: 32-byte big-endian `r` followed by 32-byte `s`.
pub type CompactSignature = [u8; COMPACT_SIGNATURE_SIZE];

pub fn digest(data: &[u8]) -> Sha256Hash {
    Sha256::digest(data).into()
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                CryptoError::InvalidSecretKey(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                CryptoError::InvalidSecretKey(e.to_string())
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// Hex of the 33-byte compressed public key, as carried in transactions.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Signs an already hashed message and returns the compact `r || s` bytes.
    pub fn sign_digest(&self, digest: &Sha256Hash) -> CompactSignature {
        let message = Message::from_digest(*digest);
        SECP256K1_CONTEXT
            .sign_ecdsa(&message, &self.secret_key)
            .serialize_compact()
    }
}

/// Verifies a compact signature over an already hashed message.
pub fn verify_digest(
    public_key_bytes: &[u8],
    digest: &Sha256Hash,
    signature: &CompactSignature,
) -> Result<(), CryptoError> {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Err(CryptoError::InvalidPublicKey(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        )));
    }

    let public_key = PublicKey::from_slice(public_key_bytes)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let signature = Signature::from_compact(signature)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let message = Message::from_digest(*digest);

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Verifies a signature where the key is hex and the signature is base58.
pub fn verify_encoded(
    public_key_hex: &str,
    digest: &Sha256Hash,
    signature: &str,
) -> Result<(), CryptoError> {
    let public_key_bytes = hex::decode(public_key_hex)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("Invalid hex: {}", e)))?;
    let signature = decode_signature(signature)?;
    verify_digest(&public_key_bytes, digest, &signature)
}

pub fn encode_signature(signature: &CompactSignature) -> String {
    bs58::encode(signature).into_string()
}

pub fn decode_signature(encoded: &str) -> Result<CompactSignature, CryptoError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    bytes.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidSignature(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            bytes.len()
        ))
    })
}
