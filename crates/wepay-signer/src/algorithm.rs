//! Hash algorithm selection and the digest/HMAC primitives built on it.
//!
//! The signer is configured with an algorithm *name* (for example `"sha512"`).
//! The name is resolved to a [`HashAlgorithm`] only when a digest is actually
//! computed, so a misconfigured name surfaces as
//! [`SignerError::UnsupportedAlgorithm`] at signing time rather than at
//! construction time.

use std::fmt;
use std::str::FromStr;

use digest::Digest;
use hmac::{Hmac, KeyInit, Mac};

use crate::error::SignerError;

/// Hash functions usable for both the plain digests and the HMAC chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (legacy, 128-bit).
    Md5,
    /// SHA-1 (legacy, 160-bit).
    Sha1,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512, the default.
    Sha512,
    /// SHA-512/224.
    Sha512_224,
    /// SHA-512/256.
    Sha512_256,
}

/// Run `$body` with `$d` bound to the concrete digest type for `$algo`.
macro_rules! with_digest {
    ($algo:expr, $d:ident => $body:expr) => {
        match $algo {
            HashAlgorithm::Md5 => {
                type $d = md5::Md5;
                $body
            }
            HashAlgorithm::Sha1 => {
                type $d = sha1::Sha1;
                $body
            }
            HashAlgorithm::Sha224 => {
                type $d = sha2::Sha224;
                $body
            }
            HashAlgorithm::Sha256 => {
                type $d = sha2::Sha256;
                $body
            }
            HashAlgorithm::Sha384 => {
                type $d = sha2::Sha384;
                $body
            }
            HashAlgorithm::Sha512 => {
                type $d = sha2::Sha512;
                $body
            }
            HashAlgorithm::Sha512_224 => {
                type $d = sha2::Sha512_224;
                $body
            }
            HashAlgorithm::Sha512_256 => {
                type $d = sha2::Sha512_256;
                $body
            }
        }
    };
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: [Self; 8] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha512_224,
        Self::Sha512_256,
    ];

    /// Canonical lowercase name of the algorithm.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_224 => "sha512-224",
            Self::Sha512_256 => "sha512-256",
        }
    }

    /// Size of the raw digest in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        with_digest!(self, D => <D as Digest>::output_size())
    }

    /// Compute the (non-keyed) digest of `data` as lowercase hex.
    ///
    /// # Examples
    ///
    /// ```
    /// use wepay_signer::algorithm::HashAlgorithm;
    ///
    /// assert_eq!(
    ///     HashAlgorithm::Sha256.hex_digest(b""),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    #[must_use]
    pub fn hex_digest(self, data: &[u8]) -> String {
        with_digest!(self, D => hex::encode(D::digest(data)))
    }

    /// Compute `HMAC(key, data)` and return the raw bytes.
    #[must_use]
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Vec<u8> {
        with_digest!(self, D => {
            let mut mac =
                Hmac::<D>::new_from_slice(key).expect("HMAC can accept keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        })
    }

    /// Compute `HMAC(key, data)` and return it as lowercase hex.
    #[must_use]
    pub fn hex_hmac(self, key: &[u8], data: &[u8]) -> String {
        hex::encode(self.hmac(key, data))
    }
}

impl FromStr for HashAlgorithm {
    type Err = SignerError;

    /// Resolve an algorithm name.
    ///
    /// Matching ignores ASCII case and `-`/`_` separators, so `"SHA512"`,
    /// `"sha-512"` and `"sha512"` all resolve to [`HashAlgorithm::Sha512`].
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "sha512224" => Ok(Self::Sha512_224),
            "sha512256" => Ok(Self::Sha512_256),
            _ => Err(SignerError::UnsupportedAlgorithm(name.to_owned())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
