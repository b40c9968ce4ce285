//! AES-256-GCM encryption for band-descriptor files at rest.
//!
//! Keys are 32 random bytes carried as URL-safe base64 text (44 chars), so
//! they can sit in an environment variable or `secrets.toml`.
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`. On disk the `.enc`
//! files hold that byte string as URL-safe base64.
//!
//! Keys have the same text form as Fernet keys, so `.enc` files written by
//! the older Fernet tooling are recognised and reported as
//! [`CipherError::LegacyFernet`] rather than as a wrong key. They are not
//! decrypted; re-encrypt the plaintext descriptors with `bandscore encrypt`.
//!
//! SECURITY: Error types never contain plaintext or key material.

use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

use bandscore_types::task::TaskVariant;

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Raw key length for AES-256.
const KEY_SIZE: usize = 32;

/// Fernet token layout: version, timestamp, IV, AES-128-CBC blocks, HMAC.
const FERNET_VERSION: u8 = 0x80;
const FERNET_HEADER_SIZE: usize = 1 + 8 + 16;
const FERNET_MAC_SIZE: usize = 32;
const FERNET_BLOCK_SIZE: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Suffix of an encrypted descriptor file.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Errors from criteria encryption operations.
///
/// IMPORTANT: These errors never include plaintext, key material, or ciphertext
/// in their Display/Debug output to prevent accidental logging of secrets.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid encryption key: expected 32 bytes of URL-safe base64")]
    InvalidKey,

    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("decryption failed (wrong key or corrupted data)")]
    DecryptionFailed,

    #[error("file uses the legacy Fernet format; re-encrypt the descriptors with `bandscore encrypt`")]
    LegacyFernet,

    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("file error: {0}")]
    Io(String),
}

/// AES-256-GCM cipher for descriptor files.
///
/// Each encryption call generates a random 12-byte nonce, prepended to the
/// ciphertext, so encrypting the same plaintext twice produces different output.
pub struct CriteriaCipher {
    cipher: Aes256Gcm,
    /// First half of the key; the Fernet signing key for the same key text.
    fernet_signing_key: [u8; 16],
    fingerprint: String,
}

impl CriteriaCipher {
    /// Create a cipher from a raw 32-byte key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let mut fernet_signing_key = [0u8; 16];
        fernet_signing_key.copy_from_slice(&key[..16]);
        Self {
            cipher: Aes256Gcm::new(key.into()),
            fernet_signing_key,
            fingerprint: fingerprint_bytes(key),
        }
    }

    /// Generate a fresh random key in its text form.
    pub fn generate_key() -> String {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        URL_SAFE.encode(key)
    }

    /// Build a cipher from the text form of a key.
    ///
    /// Accepts padded or unpadded URL-safe base64; surrounding whitespace is
    /// ignored.
    pub fn from_encoded_key(encoded: &str) -> Result<Self, CipherError> {
        let encoded = encoded.trim();
        let bytes = URL_SAFE
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| CipherError::InvalidKey)?;
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CipherError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    /// Short SHA-256 prefix identifying the key. Safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Encrypt plaintext, returning `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.len() < NONCE_SIZE {
            return Err(CipherError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::DecryptionFailed)
    }

    /// Encrypt text into its on-disk armour.
    pub fn seal_text(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(URL_SAFE.encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Reverse of [`seal_text`](Self::seal_text).
    pub fn open_text(&self, armoured: &str) -> Result<String, CipherError> {
        let armoured = armoured.trim();
        let data = URL_SAFE
            .decode(armoured)
            .or_else(|_| URL_SAFE_NO_PAD.decode(armoured))
            .map_err(|_| CipherError::InvalidEncoding)?;
        let plaintext = match self.decrypt(&data) {
            Ok(plaintext) => plaintext,
            Err(CipherError::DecryptionFailed) if self.is_fernet_token(&data) => {
                return Err(CipherError::LegacyFernet);
            }
            Err(e) => return Err(e),
        };
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }

    /// True when `data` is a Fernet token signed with this key.
    ///
    /// Only consulted after AES-GCM authentication fails, so a nonce that
    /// happens to start with the Fernet version byte is never misread.
    fn is_fernet_token(&self, data: &[u8]) -> bool {
        let min = FERNET_HEADER_SIZE + FERNET_BLOCK_SIZE + FERNET_MAC_SIZE;
        if data.len() < min
            || data[0] != FERNET_VERSION
            || (data.len() - FERNET_HEADER_SIZE - FERNET_MAC_SIZE) % FERNET_BLOCK_SIZE != 0
        {
            return false;
        }

        let (signed, tag) = data.split_at(data.len() - FERNET_MAC_SIZE);
        let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(&self.fernet_signing_key) else {
            return false;
        };
        mac.update(signed);
        mac.verify_slice(tag).is_ok()
    }
}

fn fingerprint_bytes(key: &[u8]) -> String {
    Sha256::digest(key)
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Path of the encrypted sibling of a plaintext descriptor.
pub fn encrypted_path(plain: &Path) -> PathBuf {
    let mut name = plain.as_os_str().to_os_string();
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// Outcome of [`encrypt_descriptor_files`].
#[derive(Debug, Default)]
pub struct EncryptionReport {
    /// `.enc` files written.
    pub written: Vec<PathBuf>,
    /// `.enc` files left alone because they already existed.
    pub skipped: Vec<PathBuf>,
    /// Plaintext descriptors not found in the directory.
    pub missing: Vec<PathBuf>,
}

/// Existing `.enc` files that an encryption run would replace.
pub fn existing_encrypted_files(dir: &Path) -> Vec<PathBuf> {
    TaskVariant::ALL
        .iter()
        .map(|variant| encrypted_path(&dir.join(variant.descriptor_file())))
        .filter(|path| path.exists())
        .collect()
}

/// Write a `.enc` sibling for every descriptor file present in `dir`.
///
/// Plaintext files are left in place. Existing `.enc` files are only
/// replaced when `overwrite` is set.
pub fn encrypt_descriptor_files(
    dir: &Path,
    cipher: &CriteriaCipher,
    overwrite: bool,
) -> Result<EncryptionReport, CipherError> {
    let mut report = EncryptionReport::default();

    for variant in TaskVariant::ALL {
        let plain = dir.join(variant.descriptor_file());
        let target = encrypted_path(&plain);

        if !plain.is_file() {
            report.missing.push(plain);
            continue;
        }
        if target.exists() && !overwrite {
            report.skipped.push(target);
            continue;
        }

        let text = std::fs::read_to_string(&plain)
            .map_err(|e| CipherError::Io(format!("{}: {e}", plain.display())))?;
        let sealed = cipher.seal_text(&text)?;
        std::fs::write(&target, sealed)
            .map_err(|e| CipherError::Io(format!("{}: {e}", target.display())))?;

        tracing::info!(
            task = %variant,
            file = %target.display(),
            key = cipher.fingerprint(),
            "Encrypted descriptor file"
        );
        report.written.push(target);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_key() -> [u8; 32] {
        // Deterministic key for testing only
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = CriteriaCipher::new(&test_key());
        let text = "{\"Band 9\": \"fully satisfies all the requirements\"} ✓";

        let sealed = cipher.seal_text(text).unwrap();
        assert!(!sealed.contains("Band 9"));
        assert_eq!(cipher.open_text(&sealed).unwrap(), text);
    }

    #[test]
    fn test_generated_key_is_usable() {
        let key = CriteriaCipher::generate_key();
        assert_eq!(key.len(), 44);

        let cipher = CriteriaCipher::from_encoded_key(&key).unwrap();
        let sealed = cipher.seal_text("descriptor").unwrap();

        let again = CriteriaCipher::from_encoded_key(&format!("  {key}\n")).unwrap();
        assert_eq!(again.open_text(&sealed).unwrap(), "descriptor");
        assert_eq!(cipher.fingerprint(), again.fingerprint());
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let cipher = CriteriaCipher::new(&test_key());
        let mut wrong_key = test_key();
        wrong_key[0] = 0xFF;
        let wrong = CriteriaCipher::new(&wrong_key);

        let sealed = cipher.seal_text("secret criteria").unwrap();
        assert!(matches!(
            wrong.open_text(&sealed),
            Err(CipherError::DecryptionFailed)
        ));
        assert_ne!(cipher.fingerprint(), wrong.fingerprint());
    }

    #[test]
    fn test_random_nonce_produces_different_ciphertexts() {
        let cipher = CriteriaCipher::new(&test_key());
        let first = cipher.encrypt(b"same").unwrap();
        let second = cipher.encrypt(b"same").unwrap();
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), b"same");
    }

    #[test]
    fn test_truncated_ciphertext() {
        let cipher = CriteriaCipher::new(&test_key());
        assert!(matches!(
            cipher.decrypt(&[0u8; 5]),
            Err(CipherError::CiphertextTooShort)
        ));

        let data = cipher.encrypt(b"long enough plaintext").unwrap();
        assert!(matches!(
            cipher.decrypt(&data[..data.len() - 4]),
            Err(CipherError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_invalid_key_text() {
        assert!(matches!(
            CriteriaCipher::from_encoded_key("not a key"),
            Err(CipherError::InvalidKey)
        ));
        let short = URL_SAFE.encode([1u8; 16]);
        assert!(matches!(
            CriteriaCipher::from_encoded_key(&short),
            Err(CipherError::InvalidKey)
        ));
    }

    #[test]
    fn test_open_rejects_non_base64() {
        let cipher = CriteriaCipher::new(&test_key());
        assert!(matches!(
            cipher.open_text("%%% not base64 %%%"),
            Err(CipherError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_encrypt_descriptor_files() {
        let dir = tempdir().unwrap();
        let task2 = dir.path().join(TaskVariant::Task2.descriptor_file());
        std::fs::write(&task2, "{\"task\": 2}").unwrap();

        let cipher = CriteriaCipher::new(&test_key());
        let report = encrypt_descriptor_files(dir.path(), &cipher, false).unwrap();

        assert_eq!(report.written, vec![encrypted_path(&task2)]);
        assert_eq!(report.missing.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(task2.exists());

        let sealed = std::fs::read_to_string(encrypted_path(&task2)).unwrap();
        assert_eq!(cipher.open_text(&sealed).unwrap(), "{\"task\": 2}");

        assert_eq!(existing_encrypted_files(dir.path()).len(), 1);
        let again = encrypt_descriptor_files(dir.path(), &cipher, false).unwrap();
        assert!(again.written.is_empty());
        assert_eq!(again.skipped.len(), 1);

        let forced = encrypt_descriptor_files(dir.path(), &cipher, true).unwrap();
        assert_eq!(forced.written.len(), 1);
    }

    // Written by `cryptography.fernet.Fernet` for the key in `test_key()`.
    const FERNET_TOKEN: &str = "gAAAAABlU_EAAAECAwQFBgcICQoLDA0OD92YDX0Pgx52gg2RitFIjxi_LPQHvh3UZNvh263a7DLCvC0f12F7fvY49zHxEI-NCro_bkbNrvL3YjW3Wz7sBr4=";

    #[test]
    fn test_fernet_file_is_reported_as_legacy() {
        let cipher = CriteriaCipher::new(&test_key());
        assert_eq!(
            CriteriaCipher::from_encoded_key(&URL_SAFE.encode(test_key()))
                .unwrap()
                .fingerprint(),
            cipher.fingerprint()
        );

        let err = cipher.open_text(FERNET_TOKEN).unwrap_err();
        assert!(matches!(err, CipherError::LegacyFernet));
        assert!(err.to_string().contains("bandscore encrypt"));
    }

    #[test]
    fn test_fernet_file_under_other_key_is_wrong_key() {
        let mut other = test_key();
        other[0] = 0xAA;
        let cipher = CriteriaCipher::new(&other);
        assert!(matches!(
            cipher.open_text(FERNET_TOKEN),
            Err(CipherError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_own_output_with_fernet_version_byte_still_opens() {
        let cipher = CriteriaCipher::new(&test_key());
        let sealed = (0..8192)
            .map(|_| cipher.encrypt(b"descriptor").unwrap())
            .find(|data| data[0] == FERNET_VERSION)
            .expect("a nonce starting with 0x80 within 8192 tries");
        assert_eq!(
            cipher.open_text(&URL_SAFE.encode(&sealed)).unwrap(),
            "descriptor"
        );
    }

    #[test]
    fn test_cipher_error_never_contains_secrets() {
        let errors = [
            CipherError::InvalidKey,
            CipherError::InvalidEncoding,
            CipherError::CiphertextTooShort,
            CipherError::DecryptionFailed,
            CipherError::LegacyFernet,
            CipherError::InvalidUtf8,
            CipherError::EncryptionFailed,
        ];
        let key = CriteriaCipher::generate_key();
        for err in &errors {
            assert!(!err.to_string().contains(&key));
        }
    }
}
