//! GitHub App authentication.
//!
//! GitHub authenticates an app by a short-lived JWT signed with the app's RSA
//! private key. [`AppCredential`] holds the loaded key material and
//! [`CredentialSigner`] mints a fresh [`SignedToken`] for every outbound call.

pub mod credential;
pub mod signer;

pub use credential::AppCredential;
pub use signer::{CredentialSigner, SignedToken, TOKEN_BACKDATE, TOKEN_LIFETIME};

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading a key or minting a token.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read private key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RSA private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// Caller-supplied claims may not set the registered timing/issuer claims.
    #[error("claim `{0}` is reserved and set by the signer")]
    ReservedClaim(String),

    #[error("failed to sign app token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
