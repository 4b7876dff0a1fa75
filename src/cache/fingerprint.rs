// src/cache/fingerprint.rs

/// Content-derived identity of a file: lowercase BLAKE3 hex digest.
pub type Fingerprint = String;

/// Fingerprint an in-memory buffer.
///
/// Only the bytes matter; timestamps and sizes are never consulted, so a
/// touch without modification keeps the same fingerprint.
pub fn fingerprint(contents: &[u8]) -> Fingerprint {
    blake3::hash(contents).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_content_gives_different_fingerprint() {
        assert_ne!(fingerprint(b"a"), fingerprint(b"b"));
        assert_eq!(fingerprint(b"body {}"), fingerprint(b"body {}"));
    }

    #[test]
    fn fingerprint_is_hex_digest() {
        let fp = fingerprint(b"");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
