//! # Hash Function Registry
//!
//! Maps algorithm names to digest callables so new algorithms can be added
//! without touching the manifest generator. The registry is an explicitly
//! constructed value passed by reference into the generator; there is no
//! process-wide singleton, so tests can register fakes without cross-test
//! leakage.
//!
//! Built-ins: `sha256` (streaming file checksum) and `ipfs-cid-v1`
//! (file-level UnixFS CID). The whole-tree directory CID is invoked by the
//! manifest generator directly, not through the registry.

use std::path::Path;

use skiff_crypto::HashResult;

/// Name of the built-in streaming SHA-256 file checksum.
pub const SHA256: &str = "sha256";

/// Name of the built-in file-level UnixFS CIDv1 computation.
pub const IPFS_CID_V1: &str = "ipfs-cid-v1";

/// A digest algorithm: path in, digest string out.
pub trait HashFunction {
    /// Compute the digest of the file at `path`.
    fn compute(&self, path: &Path) -> HashResult<String>;
}

// Any matching closure or fn item is a hash function; the built-ins
// register plain fn items and tests inject fakes the same way.
impl<F> HashFunction for F
where
    F: Fn(&Path) -> HashResult<String>,
{
    fn compute(&self, path: &Path) -> HashResult<String> {
        self(path)
    }
}

fn sha256_checksum(path: &Path) -> HashResult<String> {
    skiff_crypto::sha256_file(path)
}

fn file_cid(path: &Path) -> HashResult<String> {
    skiff_crypto::compute_file_cid(path).map(|info| info.cid.to_string())
}

/// An ordered name-to-algorithm lookup table.
///
/// Entries keep registration order; registering an existing name replaces
/// the callable in place without moving it.
pub struct HashRegistry {
    entries: Vec<(String, Box<dyn HashFunction>)>,
}

impl HashRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry holding the built-in algorithms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SHA256, Box::new(sha256_checksum));
        registry.register(IPFS_CID_V1, Box::new(file_cid));
        registry
    }

    /// Add or overwrite an algorithm.
    pub fn register(&mut self, name: impl Into<String>, function: Box<dyn HashFunction>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = function;
        } else {
            self.entries.push((name, function));
        }
    }

    /// Look up an algorithm by name. Unknown names return `None`; the
    /// caller decides whether that is an error.
    pub fn get(&self, name: &str) -> Option<&dyn HashFunction> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.as_ref())
    }

    /// Registered names, in registration order.
    pub fn list_available(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for HashRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRegistry")
            .field("entries", &self.list_available())
            .finish()
    }
}
