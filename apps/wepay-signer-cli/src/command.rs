//! Command-line arguments and command execution.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wepay_signer::{Payload, Signer, SignerOptions};

/// Sign a JSON payload read from stdin.
#[derive(Parser, Debug)]
#[command(name = "wepay-signer", version, about, long_about = None)]
pub struct Cli {
    /// Client id
    #[arg(long, env = "WEPAY_CLIENT_ID")]
    pub client_id: String,

    /// Client secret
    #[arg(long, env = "WEPAY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Signing-party key (overrides SIGNER_SELF_KEY)
    #[arg(long)]
    pub self_key: Option<String>,

    /// Hash algorithm (overrides SIGNER_HASH_ALGO)
    #[arg(long)]
    pub hash_algo: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// What to produce.
    #[command(subcommand)]
    pub command: Command,
}

/// What to do with the payload read from stdin.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the hex signature.
    Sign,
    /// Print the signed query string.
    Query,
    /// Check a signature; prints `valid` or `invalid`.
    Verify {
        /// Hex signature to check.
        signature: String,
    },
}

/// Outcome of running a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text for stdout.
    pub output: String,
    /// Whether the command succeeded (a failed verification is not an error).
    pub success: bool,
}

impl Cli {
    /// Signer options: environment first, then any flags on top.
    pub fn options(&self) -> SignerOptions {
        let flags = SignerOptions {
            self_key: self.self_key.clone(),
            hash_algo: self.hash_algo.clone(),
        };
        SignerOptions::from_env().merge(flags)
    }

    /// Build the signer from the parsed arguments.
    pub fn signer(&self) -> Signer {
        Signer::new(&self.client_id, &self.client_secret, self.options())
    }
}

impl Command {
    /// Run the command against a JSON payload document.
    pub fn run(&self, signer: &Signer, payload_json: &str) -> Result<Outcome> {
        let value: serde_json::Value =
            serde_json::from_str(payload_json).context("payload is not valid JSON")?;
        let mut payload = Payload::try_from(value)?;

        let outcome = match self {
            Self::Sign => Outcome {
                output: signer.sign(&payload)?,
                success: true,
            },
            Self::Query => Outcome {
                output: signer.generate_query_string_params(&mut payload)?,
                success: true,
            },
            Self::Verify { signature } => {
                let valid = signer.verify(&payload, signature)?;
                Outcome {
                    output: if valid { "valid" } else { "invalid" }.to_owned(),
                    success: valid,
                }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    const PAYLOAD: &str = r#"{"token":"t","page":"p","redirect_uri":"r"}"#;

    fn test_signer() -> Signer {
        Signer::new("id1", "secret1", SignerOptions::default())
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = ["wepay-signer", "--client-id", "id1", "--client-secret", "secret1"];
        Cli::try_parse_from(base.iter().chain(args))
    }

    #[test]
    fn test_should_parse_commands() {
        assert_eq!(parse(&["sign"]).unwrap().command, Command::Sign);
        assert_eq!(parse(&["query"]).unwrap().command, Command::Query);
        assert_eq!(
            parse(&["verify", "abc"]).unwrap().command,
            Command::Verify {
                signature: "abc".to_owned()
            }
        );
    }

    #[test]
    fn test_should_parse_identity_and_options() {
        let cli = parse(&["--hash-algo", "sha256", "--log-level", "debug", "sign"]).unwrap();
        assert_eq!(cli.client_id, "id1");
        assert_eq!(cli.client_secret, "secret1");
        assert_eq!(cli.hash_algo.as_deref(), Some("sha256"));
        assert_eq!(cli.log_level, "debug");

        let signer = cli.signer();
        assert_eq!(signer.client_id(), "id1");
        assert_eq!(signer.hash_algo(), "sha256");
    }

    #[test]
    fn test_should_reject_bad_arguments() {
        assert_eq!(
            parse(&[]).unwrap_err().kind(),
            ErrorKind::MissingSubcommand
        );
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(
            parse(&["verify"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["sign", "extra"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn test_should_print_help_instead_of_failing() {
        let err = Cli::try_parse_from(["wepay-signer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("verify"));
    }

    #[test]
    fn test_should_pass_clap_debug_assertions() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_should_sign_json_payload() {
        let outcome = Command::Sign.run(&test_signer(), PAYLOAD).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output.len(), 128);
    }

    #[test]
    fn test_should_build_query_without_secret() {
        let payload = r#"{"token":"t","client_secret":"secret1"}"#;
        let outcome = Command::Query.run(&test_signer(), payload).unwrap();
        assert!(outcome.output.starts_with("client_id=id1&stoken="));
        assert!(!outcome.output.contains("client_secret"));
    }

    #[test]
    fn test_should_verify_signature_round_trip() {
        let signer = test_signer();
        let signature = Command::Sign.run(&signer, PAYLOAD).unwrap().output;

        let outcome = Command::Verify { signature }.run(&signer, PAYLOAD).unwrap();
        assert_eq!(outcome.output, "valid");
        assert!(outcome.success);

        let outcome = Command::Verify {
            signature: "00".to_owned(),
        }
        .run(&signer, PAYLOAD)
        .unwrap();
        assert_eq!(outcome.output, "invalid");
        assert!(!outcome.success);
    }

    #[test]
    fn test_should_reject_malformed_payload() {
        assert!(Command::Sign.run(&test_signer(), "not json").is_err());
        assert!(Command::Sign.run(&test_signer(), "[1, 2]").is_err());
        assert!(Command::Sign.run(&test_signer(), r#"{"a":[1]}"#).is_err());
    }
}
