//! Error types for request signing.
//!
//! Every failure is synchronous and leaves the [`Signer`](crate::Signer)
//! untouched; no partial signature is ever produced.

/// Errors that can occur while signing or verifying a payload.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The configured hash algorithm is not a supported digest/HMAC primitive.
    ///
    /// Raised lazily, the first time a digest or HMAC is computed.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A payload value could not be coerced to its text form.
    #[error("Cannot convert value of `{key}` to a string: {reason}")]
    TypeConversion {
        /// The payload key holding the offending value.
        key: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// A JSON document could not be used as a payload.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Convenience result type for signing operations.
pub type SignerResult<T> = Result<T, SignerError>;
