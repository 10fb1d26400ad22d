//! # Content Manifest Generation
//!
//! Assembles the `skiff.json` manifest that ships inside every site
//! bundle: a service-worker-style document mapping every file in the
//! build directory to its content digest, consumed by the network's
//! serving and integrity-verification layers.
//!
//! ## Atomicity Invariant
//!
//! The manifest is written exactly once, after every file has been
//! digested. A failure anywhere in the loop aborts the run before any
//! byte reaches disk, so an interrupted generation never leaves a
//! partial manifest behind, old or new.
//!
//! ## Determinism
//!
//! Files are processed in sorted listing order and `hashTable` keys are
//! kept sorted, so regenerating over identical content yields an
//! identical document apart from the `timestamp` field. Callers that
//! need byte-for-byte reproducibility pin the timestamp through
//! [`generate_manifest_at`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};
use crate::filesystem::list_files;
use crate::registry::{HashRegistry, IPFS_CID_V1};

/// File name of the generated manifest, inside the build directory.
pub const MANIFEST_FILENAME: &str = "skiff.json";

/// Root-relative path of the manifest, as the lister reports it.
pub const MANIFEST_PATH: &str = "/skiff.json";

/// Bytes percent-encoded on top of the controls: everything outside the
/// set a URI leaves literal (alphanumerics plus `;,/?:@&=+$-_.!~*'()#`).
/// Non-ASCII is always encoded as UTF-8 percent sequences.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The manifest document written to `skiff.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Fixed schema version.
    pub config_version: u32,
    /// Milliseconds since epoch at generation time. The one field that
    /// changes across regenerations of identical content.
    pub timestamp: i64,
    /// Root document path.
    pub index: String,
    /// Asset group descriptors; exactly one group (`main`) is populated.
    pub asset_groups: Vec<AssetGroup>,
    /// Always empty; kept for schema compatibility with consumers.
    pub data_groups: Vec<serde_json::Value>,
    /// URL-encoded root-relative path to digest string.
    pub hash_table: BTreeMap<String, String>,
    /// Name of the algorithm that populated `hash_table`.
    pub hash_function: String,
    /// Whole-tree CID, present only in `ipfs-cid-v1` mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub folder_cid: Option<String>,
    /// Fixed navigation routing rules; not derived from file content.
    pub navigation_urls: Vec<NavigationUrl>,
    /// Fixed navigation strategy.
    pub navigation_request_strategy: String,
}

/// One asset group descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
    /// Group name.
    pub name: String,
    /// Install mode.
    pub install_mode: String,
    /// Update mode.
    pub update_mode: String,
    /// Cache query options.
    pub cache_query_options: CacheQueryOptions,
    /// URL-encoded paths, in listing order.
    pub urls: Vec<String>,
    /// Always empty.
    pub patterns: Vec<String>,
}

/// Cache lookup options for an asset group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheQueryOptions {
    /// Ignore the `Vary` header when matching cached responses.
    pub ignore_vary: bool,
}

/// One navigation routing rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationUrl {
    /// Whether the rule includes or excludes matching URLs.
    pub positive: bool,
    /// The rule's regular expression source.
    pub regex: String,
}

impl Manifest {
    /// Build the empty manifest skeleton: fixed navigation rules, a single
    /// lazy `main` asset group, no hashes yet.
    fn skeleton(hash_function: &str, timestamp_ms: i64) -> Self {
        Self {
            config_version: 1,
            timestamp: timestamp_ms,
            index: "/index.html".to_string(),
            asset_groups: vec![AssetGroup {
                name: "main".to_string(),
                install_mode: "lazy".to_string(),
                update_mode: "lazy".to_string(),
                cache_query_options: CacheQueryOptions { ignore_vary: true },
                urls: Vec::new(),
                patterns: Vec::new(),
            }],
            data_groups: Vec::new(),
            hash_table: BTreeMap::new(),
            hash_function: hash_function.to_string(),
            folder_cid: None,
            navigation_urls: vec![
                NavigationUrl {
                    positive: true,
                    regex: "^\\/.*$".to_string(),
                },
                NavigationUrl {
                    positive: false,
                    regex: "^\\/(?:.+\\/)?[^/]*\\.[^/]*$".to_string(),
                },
                NavigationUrl {
                    positive: false,
                    regex: "^\\/(?:.+\\/)?[^/]*__[^/]*$".to_string(),
                },
                NavigationUrl {
                    positive: false,
                    regex: "^\\/(?:.+\\/)?[^/]*__[^/]*\\/.*$".to_string(),
                },
            ],
            navigation_request_strategy: "performance".to_string(),
        }
    }
}

/// Percent-encode a root-relative path for use as a request URL key.
pub fn encode_url_path(path: &str) -> String {
    utf8_percent_encode(path, URL_ENCODE_SET).to_string()
}

/// Generate the manifest for `build_dir`, stamped with the current time.
///
/// See [`generate_manifest_at`] for the full contract.
pub fn generate_manifest(
    build_dir: &Path,
    hash_function: &str,
    registry: &HashRegistry,
) -> BundleResult<PathBuf> {
    generate_manifest_at(
        build_dir,
        hash_function,
        registry,
        chrono::Utc::now().timestamp_millis(),
    )
}

/// Generate the manifest for `build_dir` with an explicit timestamp.
///
/// Every regular file under `build_dir` except the manifest itself is
/// digested with the named algorithm and recorded in both `hashTable`
/// and the `main` asset group's `urls`, under identical URL encoding.
/// In `ipfs-cid-v1` mode the whole tree additionally gets a directory
/// CID recorded as `folderCid`. The document is written to
/// `build_dir/skiff.json` only after the entire loop succeeds; the
/// absolute path of the written file is returned.
///
/// Unknown algorithm names fail with
/// [`BundleError::UnsupportedHashFunction`] before any file I/O begins.
pub fn generate_manifest_at(
    build_dir: &Path,
    hash_function: &str,
    registry: &HashRegistry,
    timestamp_ms: i64,
) -> BundleResult<PathBuf> {
    // Resolve the algorithm first so unknown names fail fast.
    let hash_fn = registry
        .get(hash_function)
        .ok_or_else(|| BundleError::UnsupportedHashFunction {
            name: hash_function.to_string(),
            available: registry.list_available().join(", "),
        })?;

    let mut manifest = Manifest::skeleton(hash_function, timestamp_ms);

    // The manifest's own path is excluded by raw root-relative comparison,
    // before URL encoding touches the key.
    let files = list_files(build_dir)?;
    for rel in files.iter().filter(|p| p.as_str() != MANIFEST_PATH) {
        let url = encode_url_path(rel);
        let full = build_dir.join(rel.trim_start_matches('/'));
        let digest = hash_fn.compute(&full)?;

        manifest.hash_table.insert(url.clone(), digest);
        manifest.asset_groups[0].urls.push(url);
    }

    if hash_function == IPFS_CID_V1 {
        let tree = skiff_crypto::compute_dir_cid(build_dir)?;
        manifest.folder_cid = Some(tree.cid.to_string());
    }

    tracing::debug!(
        files = manifest.asset_groups[0].urls.len(),
        hash_function,
        "manifest assembled"
    );

    let out_path = build_dir.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&out_path, json).map_err(|e| BundleError::io(&out_path, e))?;

    out_path
        .canonicalize()
        .map_err(|e| BundleError::io(&out_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_crypto::{HashError, HashResult};

    fn failing_digest(path: &Path) -> HashResult<String> {
        Err(HashError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
        ))
    }

    #[test]
    fn flat_directory_sha256_scenario() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();

        let registry = HashRegistry::with_builtins();
        let path = generate_manifest(dir.path(), "sha256", &registry).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with(MANIFEST_FILENAME));

        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(manifest.config_version, 1);
        assert_eq!(manifest.index, "/index.html");
        assert_eq!(manifest.hash_function, "sha256");
        assert_eq!(manifest.hash_table.len(), 2);
        assert_eq!(
            manifest.hash_table["/index.html"],
            "e7fbb6fbbf4ce294913eb62b53ff03a7546649cfdc0d824d9e3a2b4541502f7f"
        );
        assert_eq!(
            manifest.hash_table["/style.css"],
            "7c98040a541657584690ae2a1cc3b42a8b53b159cc60c5d3abbfecbaeac6c94a"
        );
        assert_eq!(
            manifest.asset_groups[0].urls,
            vec!["/index.html", "/style.css"]
        );
        assert!(manifest.folder_cid.is_none());
        assert_eq!(manifest.navigation_urls.len(), 4);
        assert_eq!(manifest.navigation_request_strategy, "performance");
    }

    #[test]
    fn manifest_never_lists_itself() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let registry = HashRegistry::with_builtins();
        generate_manifest(dir.path(), "sha256", &registry).unwrap();
        // Second run sees the first run's skiff.json on disk.
        let path = generate_manifest(dir.path(), "sha256", &registry).unwrap();

        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.asset_groups[0].urls, vec!["/index.html"]);
        assert!(!manifest.hash_table.contains_key(MANIFEST_PATH));
    }

    #[test]
    fn unknown_algorithm_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let registry = HashRegistry::with_builtins();
        let err = generate_manifest(dir.path(), "md5", &registry).unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedHashFunction { .. }));
        assert!(!dir.path().join(MANIFEST_FILENAME).exists());
    }

    #[test]
    fn failed_digest_leaves_no_partial_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let mut registry = HashRegistry::with_builtins();
        registry.register("sha256", Box::new(failing_digest));

        let err = generate_manifest(dir.path(), "sha256", &registry).unwrap_err();
        assert!(matches!(err, BundleError::Hash(_)));
        assert!(!dir.path().join(MANIFEST_FILENAME).exists());
    }

    #[test]
    fn cid_mode_records_folder_cid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();

        let registry = HashRegistry::with_builtins();
        let path = generate_manifest(dir.path(), IPFS_CID_V1, &registry).unwrap();

        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.hash_function, IPFS_CID_V1);
        // Whole-tree CID over the two files, computed before skiff.json
        // exists on disk.
        assert_eq!(
            manifest.folder_cid.as_deref(),
            Some("bafybeicgz65jklcp6ghonytvo3t3z4xv35jgw27oxpjpafiyzf7t2hqzdm")
        );
        assert!(manifest.hash_table["/index.html"].starts_with("bafybei"));
    }

    #[test]
    fn pinned_timestamp_gives_identical_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let registry = HashRegistry::with_builtins();
        let path = generate_manifest_at(dir.path(), "sha256", &registry, 1_700_000_000_000)
            .unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        let path = generate_manifest_at(dir.path(), "sha256", &registry, 1_700_000_000_000)
            .unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn serialization_uses_two_space_indent_and_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let registry = HashRegistry::with_builtins();
        let path = generate_manifest(dir.path(), "sha256", &registry).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("\n  \"configVersion\": 1"));
        assert!(text.contains("\"hashTable\""));
        assert!(text.contains("\"navigationRequestStrategy\": \"performance\""));
        // folderCid is absent entirely in sha256 mode.
        assert!(!text.contains("folderCid"));
    }

    #[test]
    fn url_encoding_applies_to_keys_and_urls_identically() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my page.html"), b"x").unwrap();

        let registry = HashRegistry::with_builtins();
        let path = generate_manifest(dir.path(), "sha256", &registry).unwrap();

        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.asset_groups[0].urls, vec!["/my%20page.html"]);
        assert!(manifest.hash_table.contains_key("/my%20page.html"));
    }

    #[test]
    fn encode_url_path_matches_uri_literal_set() {
        assert_eq!(encode_url_path("/index.html"), "/index.html");
        assert_eq!(encode_url_path("/a b.txt"), "/a%20b.txt");
        assert_eq!(encode_url_path("/q?x=1&y=2"), "/q?x=1&y=2");
        assert_eq!(encode_url_path("/100%.txt"), "/100%25.txt");
        assert_eq!(encode_url_path("/caf\u{e9}.html"), "/caf%C3%A9.html");
    }

    #[test]
    fn missing_build_dir_is_fatal() {
        let registry = HashRegistry::with_builtins();
        let err = generate_manifest(Path::new("/tmp/skiff-no-dist"), "sha256", &registry)
            .unwrap_err();
        assert!(matches!(err, BundleError::BuildDirNotFound { .. }));
    }
}
