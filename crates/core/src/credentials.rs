//! Symmetric sealing of vendor API credentials.
//!
//! API keys are stored sealed with AES-256-GCM under a single deployment
//! key derived from a passphrase (SHA-256). The sealed form is
//! `nonce || ciphertext`, with a fresh random nonce per seal. Opening a
//! value sealed under a different key fails with a decryption error and
//! no further detail.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// AES-GCM nonce length in bytes, prepended to every sealed value.
pub const NONCE_LEN: usize = 12;

/// Errors from sealing or opening credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to seal credential")]
    Encryption,

    /// The ciphertext was not produced under the current key, or was
    /// truncated/corrupted in storage.
    #[error("credential could not be decrypted under the current key")]
    Decryption,
}

/// Deployment-wide credential sealing key.
#[derive(Clone)]
pub struct CredentialKey {
    cipher: Aes256Gcm,
}

impl CredentialKey {
    /// Derive the sealing key from a passphrase via SHA-256.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Seal a plaintext credential. Returns `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &str) -> Result<Vec<u8>, CredentialError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CredentialError::Encryption)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a sealed credential produced by [`seal`](Self::seal).
    pub fn open(&self, sealed: &[u8]) -> Result<String, CredentialError> {
        if sealed.len() <= NONCE_LEN {
            return Err(CredentialError::Decryption);
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CredentialError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| CredentialError::Decryption)
    }
}
