//! # skiff-cli — Skiff Bundle Toolchain CLI
//!
//! Provides the `skiff` command-line interface for preparing deployable
//! site bundles.
//!
//! ## Subcommands
//!
//! - `skiff bundle manifest DIR` — generate the content manifest for a
//!   build directory and print the written path.
//! - `skiff bundle checksum TARGET` — print the checksum or CID of a file
//!   or directory.
//!
//! ## Crate Policy
//!
//! Handlers delegate to `skiff-bundle` and `skiff-crypto`; argument
//! parsing stays separate from the pipeline, and every handler returns an
//! exit code rather than calling `process::exit` itself.

pub mod bundle;
