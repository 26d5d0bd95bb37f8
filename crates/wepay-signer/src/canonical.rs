//! Canonical forms used by the signing scheme.
//!
//! Three strings feed the final HMAC:
//!
//! ```text
//! Scope        = SelfKey "/" ClientId "/signer"
//!
//! Context      = sort(lowercase(key) "=" lowercase(value) "\n" ...)  (whole lines)
//!                "\n"
//!                join(";", sort(keys))
//!
//! StringToSign = "SIGNER-HMAC-" UPPER(HashAlgo) "\n"
//!                SelfKey "\n"
//!                ClientId "\n"
//!                hex(Hash(Scope)) "\n"
//!                hex(Hash(Context))
//! ```
//!
//! Every function here is pure: the same inputs always produce the same output.

use crate::algorithm::HashAlgorithm;
use crate::error::SignerResult;
use crate::payload::Payload;

/// Prefix of the first line of the string to sign.
pub const STRING_TO_SIGN_PREFIX: &str = "SIGNER-HMAC-";

/// Literal terminating the scope and the signing-key chain.
pub const SCOPE_TERMINATOR: &str = "signer";

/// Build the scope string binding a signature to a signing party and a client.
///
/// Neither component is escaped; a `/` inside either one simply produces extra
/// segments.
///
/// # Examples
///
/// ```
/// use wepay_signer::canonical::create_scope;
///
/// assert_eq!(create_scope("WePay", "abc123"), "WePay/abc123/signer");
/// ```
#[must_use]
pub fn create_scope(self_key: &str, client_id: &str) -> String {
    format!("{self_key}/{client_id}/{SCOPE_TERMINATOR}")
}

/// Build the canonical context for a payload.
///
/// Each parameter becomes a `key=value\n` line with both sides lowercased.
/// The lines are sorted as whole strings (so values take part in ordering when
/// two lowercased keys collide) and concatenated. A newline and the
/// `;`-joined, ascending list of the original keys follow.
///
/// # Errors
///
/// Returns [`SignerError::TypeConversion`](crate::SignerError::TypeConversion)
/// if a value has no text form.
///
/// # Examples
///
/// ```
/// use wepay_signer::Payload;
/// use wepay_signer::canonical::create_context;
///
/// let payload = Payload::from([("token", "ABC"), ("page", "Home")]);
/// assert_eq!(
///     create_context(&payload).unwrap(),
///     "page=home\ntoken=abc\n\npage;token"
/// );
/// ```
pub fn create_context(payload: &Payload) -> SignerResult<String> {
    let mut lines = payload
        .iter()
        .map(|(key, value)| -> SignerResult<String> {
            let value = value.to_canonical(key)?;
            Ok(format!("{}={value}\n", key.to_lowercase()))
        })
        .collect::<SignerResult<Vec<String>>>()?;

    lines.sort_unstable();

    // Payload keys already iterate in ascending byte order.
    let signed_keys = payload.keys().collect::<Vec<_>>().join(";");

    Ok(format!("{}\n{signed_keys}", lines.concat()))
}

/// Build the string to sign from the scope and context.
///
/// `hash_algo` is the configured algorithm name; it is resolved here and its
/// uppercase spelling forms the algorithm line.
///
/// # Errors
///
/// Returns [`SignerError::UnsupportedAlgorithm`](crate::SignerError::UnsupportedAlgorithm)
/// if `hash_algo` is not a supported hash function.
///
/// # Examples
///
/// ```
/// use wepay_signer::canonical::create_string_to_sign;
///
/// let sts = create_string_to_sign("sha256", "WePay", "abc123", "scope", "context").unwrap();
/// assert!(sts.starts_with("SIGNER-HMAC-SHA256\nWePay\nabc123\n"));
/// assert_eq!(sts.lines().count(), 5);
/// ```
pub fn create_string_to_sign(
    hash_algo: &str,
    self_key: &str,
    client_id: &str,
    scope: &str,
    context: &str,
) -> SignerResult<String> {
    let algorithm: HashAlgorithm = hash_algo.parse()?;
    let scope_hash = algorithm.hex_digest(scope.as_bytes());
    let context_hash = algorithm.hex_digest(context.as_bytes());

    Ok(format!(
        "{STRING_TO_SIGN_PREFIX}{}\n{self_key}\n{client_id}\n{scope_hash}\n{context_hash}",
        hash_algo.to_uppercase()
    ))
}
