//! # skiff-crypto — Content Hashing for Skiff Bundles
//!
//! This crate provides the two content-addressing primitives the bundle
//! pipeline is built on:
//!
//! - **Streaming SHA-256 checksums** of individual files, rendered as
//!   lowercase hex ([`sha256_file`]).
//! - **IPFS-compatible CID computation** for files and whole directory
//!   trees ([`compute_file_cid`], [`compute_dir_cid`]), using UnixFS node
//!   framing, DAG-PB block encoding and SHA-256 multihashes.
//!
//! ## Determinism Invariant
//!
//! Every digest produced here depends only on file content and (for
//! directories) entry names. Filesystem enumeration order, timestamps and
//! permissions never influence the output, so two machines bundling the
//! same tree always agree on every digest and CID.

pub mod checksum;
pub mod cid;
pub mod error;

// Re-export primary types.
pub use checksum::sha256_file;
pub use cid::{compute_dir_cid, compute_file_cid, CidInfo};
pub use error::{HashError, HashResult};
