// [libs/core/obfuscation/src/xor.rs]
//! Keystream derivation and XOR-stream obfuscation. These primitives never
//! raise on the decode path: a failure falls back to a readable default,
//! because peer clients treat them as best-effort text recovery, not a
//! security boundary.

use crate::mt19937::MersenneTwister;
use base64::Engine;

/// xxhash-32 of the UTF-8 bytes of `name`, used to seed the keystream generator.
pub fn seed32(name: &str) -> u32 {
    xxhash_rust::xxh32::xxh32(name.as_bytes(), 0)
}

/// Deterministic keystream shared with peer clients: seed MT19937 with
/// `seed32(name)`, draw 31-bit words packed little-endian, truncate to `n`.
pub fn keystream(name: &str, n: usize) -> Vec<u8> {
    MersenneTwister::new(seed32(name)).next_bytes(n)
}

/// XORs `data` against `key`, tiling `key` when it is shorter than `data`.
/// Output length always equals `data.len()`.
pub fn xor_stream(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, byte)| byte ^ key[i % key.len()])
        .collect()
}

/// base64 of the first 15 keystream bytes for `name`; the password used to
/// open that name's password-protected zip archive.
pub fn archive_password(name: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(keystream(name, 15))
}

/// base64-decode, XOR-stream-decode against `key`, decode UTF-16LE. Any
/// failure along that path falls back to treating `enc` itself as UTF-8.
pub fn convert_string(enc: &str, key: &[u8]) -> String {
    let recovered = (|| -> Option<String> {
        let decoded = base64::engine::general_purpose::STANDARD.decode(enc).ok()?;
        let xored = xor_stream(&decoded, key);
        if xored.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = xored
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    })();

    recovered.unwrap_or_else(|| enc.to_string())
}

/// Inverse of [`convert_string`]: encode `text` as UTF-16LE, XOR with `key`,
/// base64 the result.
pub fn encrypt_string(text: &str, key: &[u8]) -> String {
    let mut utf16le = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        utf16le.extend_from_slice(&unit.to_le_bytes());
    }
    let xored = xor_stream(&utf16le, key);
    base64::engine::general_purpose::STANDARD.encode(xored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_stream_is_its_own_inverse() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let key = b"k3y";
        let encoded = xor_stream(data, key);
        let decoded = xor_stream(&encoded, key);
        assert_eq!(decoded, data);
    }

    #[test]
    fn xor_stream_output_length_matches_data_length() {
        let data = vec![0u8; 37];
        let key = vec![1u8, 2, 3];
        assert_eq!(xor_stream(&data, &key).len(), data.len());
    }

    #[test]
    fn archive_password_is_deterministic() {
        assert_eq!(archive_password("MediaResources"), archive_password("MediaResources"));
    }

    #[test]
    fn keystream_seeded_by_game_main_config_is_stable_across_calls() {
        let a = keystream("GameMainConfig", 8);
        let b = keystream("GameMainConfig", 8);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn convert_string_falls_back_to_utf8_on_bad_base64() {
        let garbage = "not valid base64!!";
        assert_eq!(convert_string(garbage, b"key"), garbage);
    }
}
