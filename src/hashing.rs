//! Chunk identity: SHA-256 rendered as 64 lowercase hex characters.

use sha2::{Digest, Sha256};

pub const HASH_HEX_LEN: usize = 64;

/// Hashes `data` and renders the digest as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(digest)
}

/// Validates that `h` is a well-formed chunk identifier: exactly 64
/// lowercase hex characters. Uppercase hex is rejected rather than
/// normalized, since a chunk's on-disk path is derived directly from the
/// string and two different-case spellings of the same hash must not be
/// treated as the same key.
pub fn validate_hash(h: &str) -> Result<(), String> {
    if h.len() != HASH_HEX_LEN {
        return Err(format!(
            "invalid hash length: expected {HASH_HEX_LEN}, got {}",
            h.len()
        ));
    }
    if !h.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
        return Err("invalid hash format: expected lowercase hex".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_known_value() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(validate_hash("abcd").is_err());
    }

    #[test]
    fn rejects_uppercase() {
        let upper = "A".repeat(64);
        assert!(validate_hash(&upper).is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let bad = "z".repeat(64);
        assert!(validate_hash(&bad).is_err());
    }

    #[test]
    fn accepts_valid_hash() {
        let h = sha256_hex(b"hello world");
        assert!(validate_hash(&h).is_ok());
    }
}
