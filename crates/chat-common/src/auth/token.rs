//! Bearer credential attached to every gateway identify and API call

use std::fmt;
use std::str::FromStr;

/// How the credential is presented in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenType {
    /// Application bot token (`Bot <token>`)
    #[default]
    Bot,
    /// OAuth2 access token (`Bearer <token>`)
    Bearer,
}

impl TokenType {
    fn scheme(self) -> &'static str {
        match self {
            Self::Bot => "Bot",
            Self::Bearer => "Bearer",
        }
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bot" => Ok(Self::Bot),
            "bearer" => Ok(Self::Bearer),
            other => Err(format!("unknown token type: {other}")),
        }
    }
}

/// Secret credential
///
/// `Debug` never prints the secret, so configs can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    secret: String,
    kind: TokenType,
}

impl Token {
    #[must_use]
    pub fn new(secret: String, kind: TokenType) -> Self {
        let secret = secret.trim().to_string();
        // Accept tokens pasted together with their scheme
        let secret = secret
            .strip_prefix(&format!("{} ", kind.scheme()))
            .map_or(secret.clone(), str::to_string);
        Self { secret, kind }
    }

    #[must_use]
    pub fn bot(secret: impl Into<String>) -> Self {
        Self::new(secret.into(), TokenType::Bot)
    }

    /// The raw secret, as sent in the identify payload
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn kind(&self) -> TokenType {
        self.kind
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.kind.scheme(), self.secret)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("secret", &"[redacted]")
            .finish()
    }
}
