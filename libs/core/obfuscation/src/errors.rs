// [libs/core/obfuscation/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObfuscationError {
    #[error("aes payload too short to contain salt and iv: {0} bytes")]
    TruncatedAesPayload(usize),
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("pkcs7 padding invalid")]
    BadPadding,
    #[error("aes-cbc decryption failed")]
    CipherFailure,
    #[error("decrypted payload is not valid utf-8")]
    InvalidUtf8,
}
