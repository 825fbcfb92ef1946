//! Passphrase-based encryption for sensitive store entries.
//!
//! Output is base64 of `salt[16] || nonce[12] || ciphertext_with_tag`, with the
//! AES-256-GCM key derived by PBKDF2-HMAC-SHA256. The caller passes the entry's
//! store key as associated data, so a ciphertext copied under another key
//! fails to decrypt.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::utils::error::{AppError, AppResult};

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

fn derive_cipher(passphrase: &str, salt: &[u8]) -> Aes256Gcm {
    let mut derived_key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived_key);
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived_key))
}

/// Encrypt plaintext with a passphrase, bound to `entry_key`.
pub fn encrypt_with_passphrase(
    plaintext: &str,
    passphrase: &str,
    entry_key: &str,
) -> AppResult<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let cipher = derive_cipher(passphrase, &salt);
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext.as_bytes(),
                aad: entry_key.as_bytes(),
            },
        )
        .map_err(|e| AppError::storage(format!("Encryption failed: {}", e)))?;

    let mut combined = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(combined))
}

/// Decrypt a value produced by [`encrypt_with_passphrase`] for the same `entry_key`.
pub fn decrypt_with_passphrase(
    encrypted: &str,
    passphrase: &str,
    entry_key: &str,
) -> AppResult<String> {
    let data = BASE64
        .decode(encrypted)
        .map_err(|e| AppError::storage(format!("Base64 decode failed: {}", e)))?;

    // at least one byte of ciphertext
    if data.len() <= SALT_SIZE + NONCE_SIZE {
        return Err(AppError::storage("Invalid encrypted data: too short"));
    }

    let (salt, rest) = data.split_at(SALT_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

    let plaintext = derive_cipher(passphrase, salt)
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: entry_key.as_bytes(),
            },
        )
        .map_err(|_| {
            AppError::storage(format!(
                "Decryption of '{}' failed: wrong passphrase or corrupted data",
                entry_key
            ))
        })?;

    String::from_utf8(plaintext)
        .map_err(|e| AppError::storage(format!("Decrypted data is not valid UTF-8: {}", e)))
}
