//! Cache-key derivation.
//!
//! The cache is content-addressed: the key is a BLAKE3 digest over a
//! canonical serialization of the source text and the full environment
//! fingerprint (compiler identities, effective flags, link resources,
//! vulcan version). Identical cells under an identical environment always
//! map to the same key; any difference in either maps to a different key
//! with overwhelming probability, so there is no collision handling.

use serde::Serialize;

/// Length of the key prefix embedded in module names (128 bits of hex).
const MODULE_DIGEST_LEN: usize = 32;

#[derive(Serialize)]
struct Fingerprint<'a> {
    source: &'a str,
    fortran: &'a str,
    cc: Option<&'a str>,
    flags: Vec<&'a str>,
    link: Vec<&'a str>,
    vulcan: &'a str,
}

/// Derive the full cache key for a cell under a concrete environment.
///
/// `fortran_id` and `cc_id` are "<vendor> <version banner>" strings so a
/// toolchain upgrade re-keys every cell compiled under it. Flag and link
/// lists are sorted before hashing; ordering differences do not produce
/// distinct artifacts.
pub fn cache_key(
    source: &str,
    fortran_id: &str,
    cc_id: Option<&str>,
    flags: &[String],
    link: &[String],
) -> String {
    let mut flags: Vec<&str> = flags.iter().map(String::as_str).collect();
    flags.sort_unstable();
    let mut link: Vec<&str> = link.iter().map(String::as_str).collect();
    link.sort_unstable();

    let fp = Fingerprint {
        source,
        fortran: fortran_id,
        cc: cc_id,
        flags,
        link,
        vulcan: env!("CARGO_PKG_VERSION"),
    };

    // Field order in the struct is the canonical order; serde_json keeps it.
    let bytes = serde_json::to_vec(&fp).expect("fingerprint serialize");
    blake3::hash(&bytes).to_hex().to_string()
}

/// Filesystem-safe module name for a cache key.
pub fn module_name(key: &str) -> String {
    format!("vulcan_{}", &key[..MODULE_DIGEST_LEN.min(key.len())])
}
