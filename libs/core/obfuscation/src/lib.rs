// [libs/core/obfuscation/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBFUSCATION PRIMITIVES (ESTRATO L1 - CORE)
 * RESPONSABILIDAD: KEYSTREAM DETERMINISTA, XOR EN FLUJO, AES-CBC Y
 * CHECKSUMS DE ARCHIVO COMPLETO.
 *
 * Toda primitiva de descifrado aquí es best-effort: un fallo en el
 * camino de lectura cae a un valor legible en vez de propagar un
 * error, salvo `aes_decrypt`, cuyo framing es estricto.
 * =================================================================
 */

mod aes_cbc;
mod checksum;
mod errors;
mod mt19937;
mod scalar;
mod xor;

pub use aes_cbc::{aes_decrypt, aes_encrypt};
pub use checksum::{file_crc32, file_md5};
pub use errors::ObfuscationError;
pub use mt19937::MersenneTwister;
pub use scalar::{
    convert_f32, convert_f64, convert_i16, convert_i32, convert_i64, convert_u16, convert_u32,
    convert_u64, encrypt_f32, encrypt_f64,
};
pub use xor::{archive_password, convert_string, encrypt_string, keystream, seed32, xor_stream};
