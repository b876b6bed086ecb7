use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used for storage and lookup: trimmed and lowercased,
/// so `Cook@EXAMPLE.COM` and `cook@example.com` are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("malformed password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_mixed_case_email() {
        assert_eq!(
            normalize_email("  Cook@LONDONAPPDEV.COM "),
            "cook@londonappdev.com"
        );
    }

    #[test]
    fn normalize_keeps_already_canonical_email() {
        assert_eq!(normalize_email("cook@example.com"), "cook@example.com");
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "one", "a@b", "no spaces@example.com", "@example.com"] {
            assert!(!is_valid_email(bad), "{bad:?} should be invalid");
        }
        assert!(is_valid_email("cook@example.com"));
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("alirezaw123").expect("hashing should succeed");
        assert!(verify_password("alirezaw123", &hash).unwrap());
        assert!(!verify_password("alirezaw124", &hash).unwrap());
    }

    #[test]
    fn hashing_twice_salts_differently() {
        let a = hash_password("test123").unwrap();
        let b = hash_password("test123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
