//! Keyed-hash request signing for redirect-style handoffs.
//!
//! This crate signs a set of key/value parameters on behalf of a client that
//! holds a `client_id`/`client_secret` pair, scoped to a signing party
//! identified by a static `self_key` (`"WePay"` by default). The signature is
//! reproducible by any verifying party holding the same secret.
//!
//! # Overview
//!
//! The scheme follows the shape of AWS Signature Version 4: a scope, a
//! canonical form of the payload, a string to sign built from their hashes, and
//! a signing key derived from the secret through a chain of HMACs. The hash
//! function is configurable (`sha512` by default).
//!
//! # Usage
//!
//! ```rust
//! use wepay_signer::{Payload, Signer, SignerOptions};
//!
//! let signer = Signer::new("client-id", "client-secret", SignerOptions::default());
//!
//! let mut payload = Payload::from([
//!     ("token", "abc"),
//!     ("page", "https://example.com/checkout"),
//!     ("redirect_uri", "https://example.com/done"),
//! ]);
//!
//! let signature = signer.sign(&payload).unwrap();
//! assert!(signer.verify(&payload, &signature).unwrap());
//!
//! let query = signer.generate_query_string_params(&mut payload).unwrap();
//! assert!(query.contains(&format!("stoken={signature}")));
//! ```
//!
//! `token`, `page` and `redirect_uri` are conventionally present, but the
//! signer does not require them; omitting one simply changes what is signed.
//!
//! # Modules
//!
//! - [`algorithm`] - Hash algorithm resolution and digest/HMAC primitives
//! - [`canonical`] - Scope, context and string-to-sign construction
//! - [`config`] - Signer options and their defaults
//! - [`error`] - Signing error types
//! - [`payload`] - Payload map and scalar values
//! - [`signer`] - The [`Signer`] itself

pub mod algorithm;
pub mod canonical;
pub mod config;
pub mod error;
pub mod payload;
pub mod signer;

pub use algorithm::HashAlgorithm;
pub use config::{DEFAULT_HASH_ALGO, DEFAULT_SELF_KEY, SignerOptions};
pub use error::{SignerError, SignerResult};
pub use payload::{ParamValue, Payload};
pub use signer::Signer;
