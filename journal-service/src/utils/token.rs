use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "jrnl_";
const TOKEN_SECRET_LEN: usize = 40;

/// Generate a fresh opaque bearer token.
///
/// Returns (plaintext, digest). The plaintext is shown to the caller
/// exactly once; only the digest is persisted.
pub fn generate_token() -> (String, String) {
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_SECRET_LEN)
        .map(char::from)
        .collect();

    let plaintext = format!("{}{}", TOKEN_PREFIX, secret);
    let digest = digest_token(&plaintext);
    (plaintext, digest)
}

/// SHA-256 hex digest of a presented token, used for storage and lookup.
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_prefixed_and_unique() {
        let (first, _) = generate_token();
        let (second, _) = generate_token();

        assert!(first.starts_with(TOKEN_PREFIX));
        assert_eq!(first.len(), TOKEN_PREFIX.len() + TOKEN_SECRET_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn digest_matches_at_lookup_time() {
        let (plaintext, stored) = generate_token();
        assert_eq!(digest_token(&plaintext), stored);
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = digest_token("jrnl_example");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
