//! # Streaming SHA-256 Checksums
//!
//! Computes the SHA-256 digest of a file's byte stream through a fixed
//! buffer, so arbitrarily large bundle assets hash in constant memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{HashError, HashResult};

/// Read buffer size for streaming digests.
const READ_BUF_SIZE: usize = 8192;

/// Compute the SHA-256 digest of a file, rendered as lowercase hex.
///
/// The file is streamed through the hasher; it is never loaded into memory
/// in one piece. A zero-byte file yields the canonical empty-input digest.
pub fn sha256_file(path: &Path) -> HashResult<String> {
    let mut file = File::open(path).map_err(|e| HashError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let n = file.read(&mut buf).map_err(|e| HashError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
