use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Strategy seam for password storage. `Sha256Hasher` reproduces the
/// historical unsalted digest; `BcryptHasher` is the salted alternative.
/// Both verify against whatever they produced, so the scheme can change
/// without touching call sites.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordError>;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Unsalted hex SHA-256. Deterministic, so login can be a straight digest
/// comparison, but weak against precomputed tables. Kept for compatibility
/// with databases written by older deployments.
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(hex::encode(Sha256::digest(password.as_bytes())))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        hex::encode(Sha256::digest(password.as_bytes())) == stored
    }
}

pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        bcrypt::verify(password, stored).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_digest() {
        let hasher = Sha256Hasher;
        // SHA-256("password"), hex encoded.
        assert_eq!(
            hasher.hash("password").unwrap(),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert!(hasher.verify("password", "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"));
        assert!(!hasher.verify("Password", "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"));
    }

    #[test]
    fn bcrypt_verifies_own_output() {
        let hasher = BcryptHasher;
        let stored = hasher.hash("hunter2").unwrap();
        assert_ne!(stored, hasher.hash("hunter2").unwrap(), "bcrypt output is salted");
        assert!(hasher.verify("hunter2", &stored));
        assert!(!hasher.verify("hunter3", &stored));
    }
}
