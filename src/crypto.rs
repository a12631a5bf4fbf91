//! # Crypto Engine
//!
//! Symmetric encryption of the task summary field. Each encryption draws a
//! fresh random IV from the operating system, runs AES in CFB mode, and packs
//! `IV || ciphertext` into a URL-safe base64 envelope suitable for a text
//! column.
//!
//! A malformed envelope on decrypt is a recoverable [`CryptoError`], so a
//! single corrupted row cannot take the service down. An invalid key length
//! is a construction-time failure and should abort startup.

use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// AES block size; also the IV length prefixed to every envelope.
const IV_LEN: usize = 16;

/// Field encryption errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The configured key is not a valid AES key. Fatal at startup.
    #[error("encryption key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The stored envelope could not be decoded, is shorter than one IV, or
    /// did not decrypt to valid UTF-8. Data-integrity error.
    #[error("malformed encryption envelope")]
    MalformedEnvelope,
}

/// Key material, fixed for the engine's lifetime. The variant selects the
/// cipher strength.
#[derive(Clone)]
enum KeyMaterial {
    Aes128([u8; 16]),
    Aes192([u8; 24]),
    Aes256([u8; 32]),
}

/// Encrypts and decrypts a single text field with a fixed symmetric key.
#[derive(Clone)]
pub struct CryptoEngine {
    key: KeyMaterial,
}

impl std::fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output.
        f.debug_struct("CryptoEngine").finish_non_exhaustive()
    }
}

impl CryptoEngine {
    /// Create an engine from raw key bytes.
    ///
    /// The key must be exactly 16, 24 or 32 bytes (AES-128/192/256).
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let key = match key.len() {
            16 => {
                let mut k = [0u8; 16];
                k.copy_from_slice(key);
                KeyMaterial::Aes128(k)
            }
            24 => {
                let mut k = [0u8; 24];
                k.copy_from_slice(key);
                KeyMaterial::Aes192(k)
            }
            32 => {
                let mut k = [0u8; 32];
                k.copy_from_slice(key);
                KeyMaterial::Aes256(k)
            }
            other => return Err(CryptoError::InvalidKeyLength(other)),
        };

        Ok(Self { key })
    }

    /// Encrypt a plaintext into a URL-safe base64 envelope.
    ///
    /// A fresh IV is drawn per call, so encrypting the same plaintext twice
    /// yields different envelopes.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buf = plaintext.as_bytes().to_vec();
        match &self.key {
            KeyMaterial::Aes128(k) => {
                cfb_mode::Encryptor::<Aes128>::new(k.into(), &iv.into()).encrypt(&mut buf);
            }
            KeyMaterial::Aes192(k) => {
                cfb_mode::Encryptor::<Aes192>::new(k.into(), &iv.into()).encrypt(&mut buf);
            }
            KeyMaterial::Aes256(k) => {
                cfb_mode::Encryptor::<Aes256>::new(k.into(), &iv.into()).encrypt(&mut buf);
            }
        }

        let mut envelope = Vec::with_capacity(IV_LEN + buf.len());
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(&buf);
        URL_SAFE.encode(envelope)
    }

    /// Decrypt an envelope produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, envelope: &str) -> Result<String, CryptoError> {
        let decoded = URL_SAFE
            .decode(envelope)
            .map_err(|_| CryptoError::MalformedEnvelope)?;

        if decoded.len() < IV_LEN {
            return Err(CryptoError::MalformedEnvelope);
        }
        let (iv, ciphertext) = decoded.split_at(IV_LEN);
        let mut iv_block = [0u8; IV_LEN];
        iv_block.copy_from_slice(iv);

        let mut buf = ciphertext.to_vec();
        match &self.key {
            KeyMaterial::Aes128(k) => {
                cfb_mode::Decryptor::<Aes128>::new(k.into(), &iv_block.into()).decrypt(&mut buf);
            }
            KeyMaterial::Aes192(k) => {
                cfb_mode::Decryptor::<Aes192>::new(k.into(), &iv_block.into()).decrypt(&mut buf);
            }
            KeyMaterial::Aes256(k) => {
                cfb_mode::Decryptor::<Aes256>::new(k.into(), &iv_block.into()).decrypt(&mut buf);
            }
        }

        String::from_utf8(buf).map_err(|_| CryptoError::MalformedEnvelope)
    }
}
