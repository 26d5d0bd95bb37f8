//! Signer options.
//!
//! Provides [`SignerOptions`], the optional half of a signer's identity. Each
//! field falls back to its own default when unset, so a caller can override
//! `hash_algo` alone and still get the default `self_key`.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default signing-party key.
pub const DEFAULT_SELF_KEY: &str = "WePay";

/// Default hash algorithm name.
pub const DEFAULT_HASH_ALGO: &str = "sha512";

/// Optional signer settings, merged with defaults field by field.
///
/// Unknown keys are ignored when deserializing.
///
/// # Examples
///
/// ```
/// use wepay_signer::SignerOptions;
///
/// let options = SignerOptions::builder().hash_algo("sha256").build();
/// assert_eq!(options.self_key(), "WePay");
/// assert_eq!(options.hash_algo(), "sha256");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default, rename_all = "camelCase")]
pub struct SignerOptions {
    /// Signing-party identifier. Defaults to [`DEFAULT_SELF_KEY`].
    #[builder(default, setter(strip_option, into))]
    #[serde(alias = "self_key")]
    pub self_key: Option<String>,

    /// Hash algorithm name. Defaults to [`DEFAULT_HASH_ALGO`].
    ///
    /// Not validated here; an unsupported name fails at signing time.
    #[builder(default, setter(strip_option, into))]
    #[serde(alias = "hash_algo")]
    pub hash_algo: Option<String>,
}

impl SignerOptions {
    /// Load options from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `SIGNER_SELF_KEY` | `self_key` |
    /// | `SIGNER_HASH_ALGO` | `hash_algo` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(v) = std::env::var("SIGNER_SELF_KEY") {
            options.self_key = Some(v);
        }
        if let Ok(v) = std::env::var("SIGNER_HASH_ALGO") {
            options.hash_algo = Some(v);
        }

        options
    }

    /// The effective signing-party key.
    #[must_use]
    pub fn self_key(&self) -> &str {
        self.self_key.as_deref().unwrap_or(DEFAULT_SELF_KEY)
    }

    /// The effective hash algorithm name.
    #[must_use]
    pub fn hash_algo(&self) -> &str {
        self.hash_algo.as_deref().unwrap_or(DEFAULT_HASH_ALGO)
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            self_key: other.self_key.or(self.self_key),
            hash_algo: other.hash_algo.or(self.hash_algo),
        }
    }
}
