//! Password hashing and verification.
//!
//! Credentials are stored as salted PBKDF2-HMAC-SHA512 digests. The salt is
//! generated per account from the OS CSPRNG and never reused; the iterative
//! KDF makes brute force cost-proportional to the iteration count.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

// ---

/// PBKDF2 iteration count. Raising this strengthens new digests without any
/// protocol change, but existing digests verify only with the count they
/// were created under.
pub const PBKDF2_ITERATIONS: u32 = 1_000;

/// Length of the derived digest in bytes.
pub const DIGEST_LENGTH: usize = 64;

/// Length of the per-account salt in bytes.
pub const SALT_LENGTH: usize = 16;

// ---

/// Generates a fresh random salt for a new credential.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    // ---
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives the password digest for storage or comparison.
///
/// Deterministic for identical `(password, salt)` inputs.
pub fn hash_password(password: &str, salt: &[u8]) -> [u8; DIGEST_LENGTH] {
    // ---
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut digest);
    digest
}

/// Recomputes the digest for `password` under `salt` and compares it against
/// `expected` in constant time.
///
/// The comparison must not let an attacker infer digest prefixes from
/// timing; `ct_eq` also reports length mismatches without short-circuiting.
pub fn verify_password(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    // ---
    let digest = hash_password(password, salt);
    digest.as_slice().ct_eq(expected).into()
}
