use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header};
use serde_json::{Map, Value};

use super::{AppCredential, CredentialError};

/// How far `iat` is set in the past, to absorb clock drift against GitHub.
pub const TOKEN_BACKDATE: Duration = Duration::seconds(60);

/// Time from `iat` to `exp`. GitHub rejects app JWTs valid for more than ten
/// minutes.
pub const TOKEN_LIFETIME: Duration = Duration::seconds(600);

const RESERVED_CLAIMS: [&str; 3] = ["iss", "iat", "exp"];

/// A freshly minted app JWT.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub issuer: String,
}

impl SignedToken {
    /// The value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedToken")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Mints RS256 app tokens from an [`AppCredential`].
///
/// Tokens are never cached; callers sign one per request.
#[derive(Debug, Clone)]
pub struct CredentialSigner {
    credential: Arc<AppCredential>,
}

impl CredentialSigner {
    pub fn new(credential: AppCredential) -> Self {
        CredentialSigner {
            credential: Arc::new(credential),
        }
    }

    pub fn credential(&self) -> &AppCredential {
        &self.credential
    }

    /// Signs `claims` as of `now`, adding `iss`, `iat` and `exp`.
    ///
    /// Output is deterministic for a fixed `now` and claim set.
    pub fn sign(
        &self,
        claims: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, CredentialError> {
        if let Some(reserved) = RESERVED_CLAIMS.iter().find(|c| claims.contains_key(**c)) {
            return Err(CredentialError::ReservedClaim((*reserved).to_string()));
        }

        let issued_at = now - TOKEN_BACKDATE;
        let expires_at = issued_at + TOKEN_LIFETIME;
        let issuer = self.credential.app_id().to_string();

        let mut claims = claims;
        claims.insert("iss".into(), Value::String(issuer.clone()));
        claims.insert("iat".into(), Value::from(issued_at.timestamp()));
        claims.insert("exp".into(), Value::from(expires_at.timestamp()));

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &Value::Object(claims),
            self.credential.key(),
        )
        .map_err(CredentialError::Signing)?;

        Ok(SignedToken {
            token,
            issued_at,
            expires_at,
            issuer,
        })
    }

    /// Mints a token with only the registered claims, as of the current time.
    pub fn mint(&self) -> Result<SignedToken, CredentialError> {
        self.sign(Map::new(), Utc::now())
    }
}
