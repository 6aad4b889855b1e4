//! Content fingerprints for deployable artifacts

use sha2::{Digest, Sha256};

/// Algorithm prefix of every fingerprint
pub const ALGORITHM: &str = "sha256";

/// `sha256:<hex>` digest of `content`
#[must_use]
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{ALGORITHM}:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let source = b"module.exports = { main: function (event, context) { return 'hello' } }";
        assert_eq!(fingerprint(source), fingerprint(source));
    }

    #[test]
    fn test_fingerprint_format() {
        assert_eq!(
            fingerprint(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_single_byte_change_changes_fingerprint() {
        assert_ne!(fingerprint(b"return 'hello'"), fingerprint(b"return 'hellp'"));
    }
}
