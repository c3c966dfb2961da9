use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// PHC string for `plain`, salted per call.
pub fn hash_password(plain: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
}

/// `Err` means the stored value is not a usable PHC hash; a mismatch is `Ok(false)`.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, Error> {
    let phc = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(plain.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_password_round_trips() {
        let stored = hash_password("password123").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("password123", &stored).unwrap());
        assert!(!verify_password("password124", &stored).unwrap());
    }

    #[test]
    fn each_hash_gets_its_own_salt() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn plaintext_in_the_store_is_an_error() {
        assert!(verify_password("secret", "secret").is_err());
    }
}
