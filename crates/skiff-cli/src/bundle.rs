//! # Bundle Subcommand
//!
//! Site bundle operations: manifest generation and checksum/CID
//! computation. Wraps the `skiff-bundle` pipeline; the archive packaging
//! step that consumes the manifest lives outside this tool.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use skiff_bundle::{generate_manifest_at, HashRegistry, IPFS_CID_V1};

/// Arguments for the `skiff bundle` subcommand.
#[derive(Args, Debug)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub command: BundleCommand,
}

/// Bundle subcommands.
#[derive(Subcommand, Debug)]
pub enum BundleCommand {
    /// Generate a site manifest for a build directory.
    Manifest {
        /// Path to the app's build directory (e.g. ./dist).
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Hash function used to populate the manifest's hash table.
        #[arg(long, default_value = "sha256")]
        hash_function: String,

        /// Pin the manifest timestamp (milliseconds since epoch) for
        /// reproducible output.
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Print the checksum of a file or the CID of a directory.
    Checksum {
        /// The file (for sha256) or directory (for ipfs-cid-v1) to checksum.
        #[arg(value_name = "FILE|DIR")]
        target: PathBuf,

        /// Hash function to use (sha256 for a file checksum, ipfs-cid-v1
        /// for a directory CID).
        #[arg(long, default_value = "sha256")]
        hash_function: String,
    },
}

/// Execute the bundle subcommand.
pub fn run_bundle(args: &BundleArgs) -> Result<u8> {
    let registry = HashRegistry::with_builtins();

    match &args.command {
        BundleCommand::Manifest {
            dir,
            hash_function,
            timestamp,
        } => cmd_manifest(&registry, dir, hash_function, *timestamp),

        BundleCommand::Checksum {
            target,
            hash_function,
        } => cmd_checksum(&registry, target, hash_function),
    }
}

/// Generate the manifest and print the written path.
fn cmd_manifest(
    registry: &HashRegistry,
    dir: &Path,
    hash_function: &str,
    timestamp: Option<i64>,
) -> Result<u8> {
    let timestamp_ms = resolve_timestamp(timestamp);
    let manifest_path = generate_manifest_at(dir, hash_function, registry, timestamp_ms)?;

    println!("{}", manifest_path.display());
    Ok(0)
}

/// Print the raw digest or CID of the target.
fn cmd_checksum(registry: &HashRegistry, target: &Path, hash_function: &str) -> Result<u8> {
    let Some(hash_fn) = registry.get(hash_function) else {
        bail!(
            "unsupported hash function {:?} (available: {})",
            hash_function,
            registry.list_available().join(", ")
        );
    };

    let checksum = if hash_function == IPFS_CID_V1 {
        // The whole-tree scheme expects a directory and resolves it to a
        // single root CID; everything else digests the target as a file.
        skiff_crypto::compute_dir_cid(target)?.cid.to_string()
    } else {
        hash_fn.compute(target)?
    };

    println!("{checksum}");
    Ok(0)
}

/// Resolve the manifest timestamp.
///
/// Priority:
/// 1. Explicit --timestamp flag
/// 2. SOURCE_DATE_EPOCH environment variable (seconds since epoch)
/// 3. Current wall-clock time
fn resolve_timestamp(flag: Option<i64>) -> i64 {
    if let Some(ts) = flag {
        return ts;
    }

    if let Ok(epoch_str) = std::env::var("SOURCE_DATE_EPOCH") {
        if let Ok(epoch) = epoch_str.parse::<i64>() {
            return epoch * 1000;
        }
    }

    chrono::Utc::now().timestamp_millis()
}
