// src/utils/hash.rs

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// How account passwords are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// Stored verbatim and compared byte for byte.
    Plaintext,
    /// Stored as a salted Argon2 PHC string.
    Argon2,
}

impl PasswordPolicy {
    pub fn from_flag(hash_passwords: bool) -> Self {
        if hash_passwords {
            PasswordPolicy::Argon2
        } else {
            PasswordPolicy::Plaintext
        }
    }

    /// Produces the value to store for `password`.
    pub fn digest(self, password: &str) -> Result<String, AppError> {
        match self {
            PasswordPolicy::Plaintext => Ok(password.to_string()),
            PasswordPolicy::Argon2 => hash_password(password),
        }
    }

    pub fn verify(self, password: &str, stored: &str) -> Result<bool, AppError> {
        match self {
            PasswordPolicy::Plaintext => Ok(password == stored),
            PasswordPolicy::Argon2 => verify_password(password, stored),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);

    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_round_trip() {
        let policy = PasswordPolicy::Argon2;
        let stored = policy.digest("secret1").unwrap();
        assert_ne!(stored, "secret1");
        assert!(policy.verify("secret1", &stored).unwrap());
        assert!(!policy.verify("wrong", &stored).unwrap());
    }

    #[test]
    fn plaintext_compares_exactly() {
        let policy = PasswordPolicy::Plaintext;
        let stored = policy.digest("secret1").unwrap();
        assert!(policy.verify("secret1", &stored).unwrap());
        assert!(!policy.verify("Secret1", &stored).unwrap());
    }
}
