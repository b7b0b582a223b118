use secrecy::SecretString;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("{0} not found. Set it as an environment variable or in a .env file.")]
    MissingApiKey(String),
}

/// API key for the oracle endpoint.
///
/// Locally reads from `.env` via dotenvy, otherwise from the process
/// environment. The key is wrapped in [`SecretString`] to prevent accidental
/// logging or debug output.
#[derive(Clone)]
pub struct ApiKey {
    pub var: String,
    pub secret: SecretString,
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("var", &self.var)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiKey {
    /// Load the key named by `var`.
    pub fn load(var: &str) -> Result<Self, CredentialsError> {
        // A missing .env is the normal case outside development.
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        tracing::debug!(dotenv = dotenv_loaded, var, "loading API key");

        Self::from_env(var)
    }

    /// Read `var` from the process environment only.
    pub fn from_env(var: &str) -> Result<Self, CredentialsError> {
        let value = std::env::var(var)
            .map_err(|_| CredentialsError::MissingApiKey(var.to_owned()))?;
        if value.trim().is_empty() {
            return Err(CredentialsError::MissingApiKey(var.to_owned()));
        }
        Ok(Self {
            var: var.to_owned(),
            secret: SecretString::from(value),
        })
    }
}
