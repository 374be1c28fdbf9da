//! Salted, memory-hard password credentials encoded as `salt:hexdigest`.

use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

const SALT_BYTES: usize = 16;
const KEY_BYTES: usize = 64;

fn derive_key(password: &str, salt: &str) -> Result<[u8; KEY_BYTES], argon2::Error> {
    let mut key = [0u8; KEY_BYTES];
    Argon2::default().hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key)?;
    Ok(key)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let mut salt = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| AppError::Internal(format!("OS randomness unavailable: {e}")))?;
    let salt = hex::encode(salt);

    let key = derive_key(password, &salt)
        .map_err(|e| AppError::Internal(format!("Key derivation failed: {e}")))?;

    Ok(format!("{salt}:{}", hex::encode(key)))
}

/// Checks `password` against a stored credential. Malformed credentials
/// never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once(':') else {
        return false;
    };
    if salt.is_empty() || digest.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let Ok(derived) = derive_key(password, salt) else {
        return false;
    };

    expected.len() == derived.len() && bool::from(expected.as_slice().ct_eq(&derived[..]))
}
