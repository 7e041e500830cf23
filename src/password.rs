//! Credential engine: salted, memory-hard password hashing with a legacy
//! algorithm escape hatch, and the session-token digest.

use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::Params;
use sha2::{Digest, Sha256};

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;

// log2(N) = 14, r = 8, p = 1: the parameters previously issued credentials
// were derived with. Changing them invalidates every stored hash.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Algorithm tag stored next to each credential. New credentials always use
/// the current algorithm; verification accepts the legacy one too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Scrypt,
    LegacySha256,
}

impl HashAlgorithm {
    pub const CURRENT: Self = Self::Scrypt;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scrypt => "scrypt",
            Self::LegacySha256 => "sha256",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "scrypt" => Some(Self::Scrypt),
            "sha256" => Some(Self::LegacySha256),
            _ => None,
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Password must be at least 8 characters.",
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password is too long."));
    }
    Ok(())
}

/// 16 random bytes from the OS RNG, hex-encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Deterministic, salt-dependent scrypt derivation (hex output).
pub fn hash_password(password: &str, salt: &str) -> Result<String, AppError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|_| AppError::validation("invalid key derivation parameters"))?;
    let mut out = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut out)
        .map_err(|_| AppError::validation("key derivation failed"))?;
    Ok(hex::encode(out))
}

fn legacy_sha256(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute under the stored algorithm and compare in constant time.
/// Never errors: unknown tags, derivation failures and length mismatches all
/// verify as false.
pub fn verify_password(
    password: &str,
    salt: &str,
    expected_hash: &str,
    algorithm: HashAlgorithm,
) -> bool {
    let recomputed = match algorithm {
        HashAlgorithm::Scrypt => match hash_password(password, salt) {
            Ok(hash) => hash,
            Err(_) => return false,
        },
        HashAlgorithm::LegacySha256 => legacy_sha256(password, salt),
    };
    constant_time_eq(recomputed.as_bytes(), expected_hash.as_bytes())
}

/// SHA-256 hex digest of a session token; the plaintext token is never
/// persisted or logged.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
