//! Salted password hashing
//!
//! Each user row stores a random salt and a PBKDF2-HMAC-SHA256 digest in
//! the form `pbkdf2-sha256$<iterations>$<hex>`. The iteration count travels
//! with the hash, so raising [`PBKDF2_ITERATIONS`] leaves older rows
//! verifiable.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

/// Salt length in bytes before hex encoding
const SALT_BYTES: usize = 16;

/// Derived key length in bytes
const KEY_BYTES: usize = 32;

/// PBKDF2 rounds for newly hashed passwords
pub const PBKDF2_ITERATIONS: u32 = 100_000;

const SCHEME: &str = "pbkdf2-sha256";

/// Generate a fresh random salt, hex encoded
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hash `password` with `salt` at the default iteration count
///
/// # Examples
///
/// ```
/// use guampa_common::password::hash_password;
///
/// let hash = hash_password("secret", "abcd");
/// assert!(hash.starts_with("pbkdf2-sha256$"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    hash_with_iterations(password, salt, PBKDF2_ITERATIONS)
}

fn hash_with_iterations(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}${}${}",
        SCHEME,
        iterations,
        to_hex(&derive(password, salt, iterations))
    )
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; KEY_BYTES] {
    let mut key = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

/// Check `password` against a stored salt and hash
///
/// Hashes that do not parse never verify.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let Some(iterations) = parse_iterations(stored_hash) else {
        return false;
    };
    let calculated = hash_with_iterations(password, salt, iterations);
    // Compare without early exit on the first differing byte
    calculated.len() == stored_hash.len()
        && calculated
            .bytes()
            .zip(stored_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn parse_iterations(stored_hash: &str) -> Option<u32> {
    let mut parts = stored_hash.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let digest = parts.next()?;
    if iterations == 0 || digest.len() != KEY_BYTES * 2 || parts.next().is_some() {
        return None;
    }
    Some(iterations)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
