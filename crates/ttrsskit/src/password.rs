//! TT-RSS password hashing.
//!
//! TT-RSS stores `pwd_hash` as `<ALGO>:<hex digest>` next to a per-user
//! `salt` column, and checks logins by recomputing the digest over
//! `salt ‖ password`. New hashes use `SSHA-512`, which is what TT-RSS
//! itself writes; `SSHA-256` and the older `MODE2` (same digest as
//! `SSHA-256`) are still verified.

use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};

/// Bytes of randomness in a new salt (hex-encoded to 250 characters).
const SALT_BYTES: usize = 125;

/// A hashing scheme TT-RSS understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgo {
    /// `SSHA-512:` + hex(SHA-512(salt ‖ password)), the current default
    Ssha512,
    /// `SSHA-256:` + hex(SHA-256(salt ‖ password))
    Ssha256,
    /// `MODE2:` + hex(SHA-256(salt ‖ password))
    Mode2,
}

impl HashAlgo {
    /// Prefix stored before the digest.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ssha512 => "SSHA-512",
            Self::Ssha256 => "SSHA-256",
            Self::Mode2 => "MODE2",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "SSHA-512" => Some(Self::Ssha512),
            "SSHA-256" => Some(Self::Ssha256),
            "MODE2" => Some(Self::Mode2),
            _ => None,
        }
    }
}

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
    /// Stored with a scheme this crate does not compute (e.g. legacy `SHA1`)
    UnsupportedScheme,
}

/// Generate a fresh salt the way TT-RSS does: 250 hex characters.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash `password` with `salt` using `algo`, returning the stored form.
pub fn hash_password(password: &str, salt: &str, algo: HashAlgo) -> String {
    let digest = match algo {
        HashAlgo::Ssha512 => {
            let mut hasher = Sha512::new();
            hasher.update(salt.as_bytes());
            hasher.update(password.as_bytes());
            hex::encode(hasher.finalize())
        }
        HashAlgo::Ssha256 | HashAlgo::Mode2 => {
            let mut hasher = Sha256::new();
            hasher.update(salt.as_bytes());
            hasher.update(password.as_bytes());
            hex::encode(hasher.finalize())
        }
    };
    format!("{}:{digest}", algo.prefix())
}

/// Check `password` against a stored `pwd_hash` and its salt.
pub fn verify_password(password: &str, salt: &str, stored: &str) -> Verification {
    let Some((prefix, digest)) = stored.split_once(':') else {
        return Verification::UnsupportedScheme;
    };
    let Some(algo) = HashAlgo::from_prefix(prefix) else {
        return Verification::UnsupportedScheme;
    };

    let expected = hash_password(password, salt, algo);
    let computed = &expected[prefix.len() + 1..];
    if computed.eq_ignore_ascii_case(digest) {
        Verification::Match
    } else {
        Verification::Mismatch
    }
}
