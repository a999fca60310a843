// [libs/core/obfuscation/src/scalar.rs]
//! Scalar XOR helpers for the numeric fields table rows carry obfuscated.
//! Each scalar is packed little-endian, XORed byte-wise against `key`, then
//! unpacked. Because XOR is its own inverse, the same function encodes and
//! decodes integers; only the float/double variants need a directional
//! scale factor, since the wire value is an integer count of hundred-
//! thousandths.

use crate::xor::xor_stream;

macro_rules! scalar_convert {
    ($name:ident, $ty:ty) => {
        pub fn $name(value: $ty, key: &[u8]) -> $ty {
            let packed = value.to_le_bytes();
            let xored = xor_stream(&packed, key);
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(&xored);
            <$ty>::from_le_bytes(buf)
        }
    };
}

scalar_convert!(convert_i16, i16);
scalar_convert!(convert_i32, i32);
scalar_convert!(convert_i64, i64);
scalar_convert!(convert_u16, u16);
scalar_convert!(convert_u32, u32);
scalar_convert!(convert_u64, u64);

const FLOAT_SCALE: f64 = 0.00001;
const FLOAT_UNSCALE: f64 = 100000.0;

/// Decode a wire-encoded scaled float: XOR-unpack as i32, then scale down.
pub fn convert_f32(encoded: i32, key: &[u8]) -> f32 {
    (convert_i32(encoded, key) as f64 * FLOAT_SCALE) as f32
}

/// Scale `value` up and XOR-pack it as the wire-encoded i32.
pub fn encrypt_f32(value: f32, key: &[u8]) -> i32 {
    convert_i32((value as f64 * FLOAT_UNSCALE).round() as i32, key)
}

/// Decode a wire-encoded scaled double: XOR-unpack as i64, then scale down.
pub fn convert_f64(encoded: i64, key: &[u8]) -> f64 {
    convert_i64(encoded, key) as f64 * FLOAT_SCALE
}

/// Scale `value` up and XOR-pack it as the wire-encoded i64.
pub fn encrypt_f64(value: f64, key: &[u8]) -> i64 {
    convert_i64((value * FLOAT_UNSCALE).round() as i64, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_i32_round_trips_for_keys_at_least_four_bytes() {
        let key = b"0123";
        let value = -123_456_789;
        assert_eq!(convert_i32(convert_i32(value, key), key), value);
    }

    #[test]
    fn convert_u64_round_trips() {
        let key = b"deadbeefdeadbeef";
        let value: u64 = 0x00ff_00ff_00ff_00ff;
        assert_eq!(convert_u64(convert_u64(value, key), key), value);
    }

    #[test]
    fn float_scale_round_trip_preserves_value_within_precision() {
        let key = b"abcd";
        let value = 3.14159_f32;
        let encoded = encrypt_f32(value, key);
        let decoded = convert_f32(encoded, key);
        assert!((decoded - value).abs() < 0.0001);
    }
}
