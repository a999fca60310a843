// [libs/core/obfuscation/src/checksum.rs]
//! Whole-file checksums, streamed in fixed chunks so the verify stage never
//! has to hold a large download in memory just to confirm it downloaded
//! correctly.

use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

pub fn file_crc32<P: AsRef<Path>>(path: P) -> io::Result<u32> {
    let mut file = File::open(path)?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hasher.finalize())
}

pub fn file_md5<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn md5_of_known_content_matches_known_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        let digest = file_md5(file.path()).unwrap();
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn crc32_is_stable_across_calls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"repeatable content").unwrap();
        let first = file_crc32(file.path()).unwrap();
        let second = file_crc32(file.path()).unwrap();
        assert_eq!(first, second);
    }
}
