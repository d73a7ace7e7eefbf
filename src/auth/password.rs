use bcrypt::DEFAULT_COST;
use tracing::error;

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

// Registration rejects longer passwords up front; the hasher still
// truncates silently so it stays total on any input.
fn truncate(plain: &str) -> &[u8] {
    let bytes = plain.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let hash = bcrypt::hash(truncate(plain), DEFAULT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hash)
}

/// Fail-closed: any internal error, a malformed stored hash included, counts
/// as a failed verification and is never surfaced to the caller.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(truncate(plain), hash) {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "bcrypt verify error, treating as mismatch");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_fail_closed_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let hash_a = hash_password("same-password").unwrap();
        let hash_b = hash_password("same-password").unwrap();
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn passwords_sharing_first_72_bytes_are_equivalent() {
        let prefix = "x".repeat(MAX_PASSWORD_BYTES);
        let long_a = format!("{prefix}-tail-one");
        let long_b = format!("{prefix}-tail-two");

        let hash = hash_password(&long_a).expect("hashing should succeed");
        assert!(verify_password(&long_b, &hash));
        assert!(verify_password(&prefix, &hash));
    }
}
