use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::ports::{CredentialError, PasswordHasher};

/// Argon2 password hasher (PHC string format)
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Backend(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(password_hash).map_err(|_| CredentialError::Invalid)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Backend(format!(
                "Failed to verify password: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("rahasia").unwrap();

        assert_ne!(hash, "rahasia");
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("rahasia", &hash).unwrap());
        assert!(!hasher.verify("salah", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salt() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("rahasia").unwrap(), hasher.hash("rahasia").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = Argon2Hasher::new();
        assert!(matches!(
            hasher.verify("rahasia", "not-a-hash"),
            Err(CredentialError::Invalid)
        ));
    }
}
