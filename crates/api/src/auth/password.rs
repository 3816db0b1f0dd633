//! Password digest used by the personnel directory.
//!
//! The HR database stores unsalted MD5 hex digests. This is weak and kept only
//! so the directory's existing rows can be matched; no password is ever
//! stored by this service.

/// Lower-case hex MD5 digest of `plaintext`.
pub fn legacy_digest(plaintext: &str) -> String {
    format!("{:x}", md5::compute(plaintext.as_bytes()))
}
