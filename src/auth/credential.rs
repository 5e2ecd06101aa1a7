use std::fmt;
use std::path::Path;

use jsonwebtoken::EncodingKey;

use super::CredentialError;
use crate::types::AppId;

/// The app's identity and signing key. Immutable once loaded.
#[derive(Clone)]
pub struct AppCredential {
    app_id: AppId,
    key: EncodingKey,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl AppCredential {
    /// Loads a PEM-encoded RSA key (PKCS#1 or PKCS#8).
    pub fn from_pem(app_id: AppId, pem: &[u8]) -> Result<Self, CredentialError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(CredentialError::InvalidKey)?;
        Ok(AppCredential {
            app_id,
            key,
            client_id: None,
            client_secret: None,
        })
    }

    /// Reads and loads the key at `path`.
    pub fn from_file(app_id: AppId, path: &Path) -> Result<Self, CredentialError> {
        let pem = std::fs::read(path).map_err(|source| CredentialError::ReadKey {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(app_id, &pem)
    }

    /// Attaches the OAuth client id and secret.
    pub fn with_client(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        self.client_id = client_id;
        self.client_secret = client_secret;
        self
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub(crate) fn key(&self) -> &EncodingKey {
        &self.key
    }
}

impl fmt::Debug for AppCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredential")
            .field("app_id", &self.app_id)
            .field("key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
