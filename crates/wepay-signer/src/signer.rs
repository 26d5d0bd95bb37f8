//! The request signer.
//!
//! A [`Signer`] holds the identity material of a client (`client_id`,
//! `client_secret`) and a signing party (`self_key`), plus the name of the hash
//! function to use. Signing a payload runs the following steps:
//!
//! 1. Force `client_id` and `client_secret` into a copy of the payload.
//! 2. Build the scope and the canonical context (see [`crate::canonical`]).
//! 3. Build the string to sign from the scope and context hashes.
//! 4. Derive the signing key with a chained HMAC:
//!
//!    ```text
//!    K1         = HMAC(ClientSecret, SelfKey)
//!    K2         = HMAC(K1, ClientId)
//!    SigningKey = HMAC(K2, "signer")
//!    ```
//!
//! 5. Return `hex(HMAC(SigningKey, StringToSign))`.
//!
//! Nothing is cached between calls.

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::algorithm::HashAlgorithm;
use crate::canonical::{SCOPE_TERMINATOR, create_context, create_scope, create_string_to_sign};
use crate::config::SignerOptions;
use crate::error::SignerResult;
use crate::payload::Payload;

/// Payload key carrying the client id.
pub const CLIENT_ID_KEY: &str = "client_id";

/// Payload key carrying the client secret. Never emitted in query strings.
pub const CLIENT_SECRET_KEY: &str = "client_secret";

/// Query-string key carrying the signature.
pub const SIGNED_TOKEN_KEY: &str = "stoken";

/// Signs payloads on behalf of a client.
///
/// Immutable once built and safe to share across threads.
///
/// # Examples
///
/// ```
/// use wepay_signer::{Payload, Signer, SignerOptions};
///
/// let signer = Signer::new("id1", "secret1", SignerOptions::default());
/// let payload = Payload::from([("token", "t"), ("page", "p"), ("redirect_uri", "r")]);
///
/// let signature = signer.sign(&payload).unwrap();
/// assert_eq!(signature.len(), 128); // hex-encoded SHA-512
/// assert_eq!(signature, signer.sign(&payload).unwrap());
/// ```
#[derive(Clone)]
pub struct Signer {
    client_id: String,
    client_secret: String,
    self_key: String,
    hash_algo: String,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("self_key", &self.self_key)
            .field("hash_algo", &self.hash_algo)
            .finish()
    }
}

impl Signer {
    /// Create a signer. Unset options take their defaults.
    ///
    /// The hash algorithm name is not validated here.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        options: SignerOptions,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            self_key: options.self_key().to_owned(),
            hash_algo: options.hash_algo().to_owned(),
        }
    }

    /// The client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// The signing-party key.
    #[must_use]
    pub fn self_key(&self) -> &str {
        &self.self_key
    }

    /// The configured hash algorithm name.
    #[must_use]
    pub fn hash_algo(&self) -> &str {
        &self.hash_algo
    }

    /// The scope for this signer's `(self_key, client_id)` pair.
    #[must_use]
    pub fn create_scope(&self) -> String {
        create_scope(&self.self_key, &self.client_id)
    }

    /// The string to sign for a scope and context.
    pub fn create_string_to_sign(&self, scope: &str, context: &str) -> SignerResult<String> {
        create_string_to_sign(
            &self.hash_algo,
            &self.self_key,
            &self.client_id,
            scope,
            context,
        )
    }

    /// Derive the signing key (raw bytes) from the client secret.
    pub fn get_signing_salt(&self) -> SignerResult<Vec<u8>> {
        let algorithm = self.algorithm()?;
        let k1 = algorithm.hmac(self.client_secret.as_bytes(), self.self_key.as_bytes());
        let k2 = algorithm.hmac(&k1, self.client_id.as_bytes());
        Ok(algorithm.hmac(&k2, SCOPE_TERMINATOR.as_bytes()))
    }

    /// Sign `payload` and return the lowercase hex signature.
    ///
    /// `client_id` and `client_secret` always take this signer's values, whatever
    /// the payload holds. The caller's payload is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnsupportedAlgorithm`](crate::SignerError::UnsupportedAlgorithm)
    /// for an unknown hash algorithm, or
    /// [`SignerError::TypeConversion`](crate::SignerError::TypeConversion) if a
    /// value has no text form.
    pub fn sign(&self, payload: &Payload) -> SignerResult<String> {
        let algorithm = self.algorithm()?;

        let mut payload = payload.clone();
        payload.insert(CLIENT_ID_KEY, self.client_id.as_str());
        payload.insert(CLIENT_SECRET_KEY, self.client_secret.as_str());

        let scope = self.create_scope();
        let context = create_context(&payload)?;
        let string_to_sign = self.create_string_to_sign(&scope, &context)?;

        debug!(
            client_id = %self.client_id,
            scope = %scope,
            params = payload.len(),
            "Signing payload"
        );
        debug!(string_to_sign, "Built string to sign");

        let signing_key = self.get_signing_salt()?;
        Ok(algorithm.hex_hmac(&signing_key, string_to_sign.as_bytes()))
    }

    /// Sign `payload` and turn it into a query string body (no leading `?`).
    ///
    /// On success `payload` is updated in place: `client_secret` is removed and
    /// `client_id` and `stoken` are set. Segments are `key=value`, sorted by key
    /// and joined with `&`. Values are not percent-encoded.
    ///
    /// If signing fails the payload is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use wepay_signer::{Payload, Signer, SignerOptions};
    ///
    /// let signer = Signer::new("id1", "secret1", SignerOptions::default());
    /// let mut payload = Payload::from([("page", "p"), ("client_secret", "leak")]);
    ///
    /// let query = signer.generate_query_string_params(&mut payload).unwrap();
    /// assert!(query.starts_with("client_id=id1&page=p&stoken="));
    /// assert!(!payload.contains_key("client_secret"));
    /// ```
    pub fn generate_query_string_params(&self, payload: &mut Payload) -> SignerResult<String> {
        // `sign` overrides the secret itself, so signing before stripping it
        // yields the same token. Once it succeeds every value has a text form.
        let signed_token = self.sign(payload)?;

        payload.remove(CLIENT_SECRET_KEY);
        payload.insert(CLIENT_ID_KEY, self.client_id.as_str());
        payload.insert(SIGNED_TOKEN_KEY, signed_token);

        let query = payload
            .iter()
            .map(|(key, value)| -> SignerResult<String> {
                Ok(format!("{key}={}", value.to_text(key)?))
            })
            .collect::<SignerResult<Vec<String>>>()?
            .join("&");

        debug!(client_id = %self.client_id, params = payload.len(), "Generated query string");

        Ok(query)
    }

    /// Check `signature` against the signature of `payload`.
    ///
    /// The comparison runs in constant time.
    pub fn verify(&self, payload: &Payload, signature: &str) -> SignerResult<bool> {
        let expected = self.sign(payload)?;
        let matched: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();

        if !matched {
            debug!(client_id = %self.client_id, "Signature mismatch");
        }

        Ok(matched)
    }

    fn algorithm(&self) -> SignerResult<HashAlgorithm> {
        self.hash_algo.parse()
    }
}
