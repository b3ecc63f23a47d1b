//! age encryption.
//!
//! Secret payloads are encrypted for a set of x25519 recipients and stored
//! ASCII-armored.

use std::io::{Read, Write};

use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::StoreError;

/// Encrypt plaintext for every recipient.
///
/// # Errors
///
/// Returns `StoreError::EncryptionFailed` if there are no recipients or the
/// age writer fails.
pub fn encrypt(plaintext: &[u8], recipients: &[x25519::Recipient]) -> Result<String, StoreError> {
    trace!(
        recipients = recipients.len(),
        plaintext_len = plaintext.len(),
        "encrypting"
    );

    let encryptor =
        age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn age::Recipient))
            .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    let mut encrypted = Vec::new();
    let armor =
        age::armor::ArmoredWriter::wrap_output(&mut encrypted, age::armor::Format::AsciiArmor)
            .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;
    let mut writer = encryptor
        .wrap_output(armor)
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    writer
        .write_all(plaintext)
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;
    writer
        .finish()
        .and_then(|armor| armor.finish())
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    trace!(ciphertext_len = encrypted.len(), "encrypted");

    String::from_utf8(encrypted).map_err(|e| StoreError::EncryptionFailed(e.to_string()))
}

/// Decrypt an armored payload with the given identity.
///
/// # Errors
///
/// Returns `StoreError::DecryptionFailed` if the payload is malformed or the
/// identity is not a recipient.
pub fn decrypt(
    encrypted: &str,
    identity: &x25519::Identity,
) -> Result<Zeroizing<Vec<u8>>, StoreError> {
    trace!(ciphertext_len = encrypted.len(), "decrypting");

    let reader = age::armor::ArmoredReader::new(encrypted.as_bytes());
    let decryptor =
        age::Decryptor::new(reader).map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;

    let mut decrypted = Zeroizing::new(Vec::new());
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;

    trace!(plaintext_len = decrypted.len(), "decrypted");

    Ok(decrypted)
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// Returns `StoreError::InvalidRecipient` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient, StoreError> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| StoreError::InvalidRecipient(key.to_string()))
}
