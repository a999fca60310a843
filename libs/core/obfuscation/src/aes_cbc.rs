// [libs/core/obfuscation/src/aes_cbc.rs]
//! AES-128-CBC with a PBKDF2-HMAC-SHA1 derived key, wire format
//! `salt(16) || iv(16) || ciphertext`, all base64-encoded together. This is
//! the scheme table rows and the JP `GameMainConfig` payload use.

use crate::errors::ObfuscationError;
use aes::Aes128;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha1::Sha1;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const AES_BLOCK_SIZE: usize = 16;
const AES_KEY_SIZE: usize = 16;
const PBKDF2_ITERATIONS: u32 = 1000;

fn derive_key(phrase: &str, salt: &[u8]) -> [u8; AES_KEY_SIZE] {
    let mut key = [0u8; AES_KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha1>(phrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Decrypts a base64 payload shaped `salt(16) || iv(16) || ciphertext`.
pub fn aes_decrypt(b64: &str, phrase: &str) -> Result<String, ObfuscationError> {
    let raw = base64::engine::general_purpose::STANDARD.decode(b64)?;
    if raw.len() < AES_BLOCK_SIZE * 2 {
        return Err(ObfuscationError::TruncatedAesPayload(raw.len()));
    }
    let (salt, rest) = raw.split_at(AES_BLOCK_SIZE);
    let (iv, ciphertext) = rest.split_at(AES_BLOCK_SIZE);

    let key = derive_key(phrase, salt);
    let plain = Aes128CbcDec::new(&key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| ObfuscationError::BadPadding)?;

    String::from_utf8(plain).map_err(|_| ObfuscationError::InvalidUtf8)
}

/// Encrypts `text` under a freshly generated salt and iv, producing the same
/// `salt || iv || ciphertext` wire shape `aes_decrypt` consumes.
pub fn aes_encrypt(text: &str, phrase: &str) -> String {
    let mut salt = [0u8; AES_BLOCK_SIZE];
    let mut iv = [0u8; AES_BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut iv);

    let key = derive_key(phrase, &salt);
    let ciphertext = Aes128CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(text.as_bytes());

    let mut wire = Vec::with_capacity(AES_BLOCK_SIZE * 2 + ciphertext.len());
    wire.extend_from_slice(&salt);
    wire.extend_from_slice(&iv);
    wire.extend_from_slice(&ciphertext);
    base64::engine::general_purpose::STANDARD.encode(wire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encrypt_then_decrypt() {
        let phrase = "archive-phrase";
        let text = "{\"resources\":[]}";
        let cipher = aes_encrypt(text, phrase);
        let plain = aes_decrypt(&cipher, phrase).unwrap();
        assert_eq!(plain, text);
    }

    #[test]
    fn rejects_truncated_payload() {
        let err = aes_decrypt(&base64::engine::general_purpose::STANDARD.encode(b"short"), "phrase");
        assert!(matches!(err, Err(ObfuscationError::TruncatedAesPayload(_))));
    }
}
