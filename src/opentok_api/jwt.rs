use crate::opentok_api::types::OpenTokError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Value of the `ist` claim for project-scoped tokens
pub const PROJECT_TOKEN_SCOPE: &str = "project";

/// Claims carried by an OpenTok project token
///
/// The token authenticates REST calls on behalf of a whole project (API key),
/// as opposed to client tokens that grant access to a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectClaims {
    /// Issuer - the project API key
    pub iss: String,
    /// Issuer type, always "project"
    pub ist: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID
    pub jti: String,
}

impl ProjectClaims {
    /// Build claims for `api_key` valid for `ttl` from now
    pub fn new(api_key: impl Into<String>, ttl: Duration) -> Self {
        let iat = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            iss: api_key.into(),
            ist: PROJECT_TOKEN_SCOPE.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Source of the short-lived token sent in the `X-OPENTOK-AUTH` header
///
/// The client calls this once per request. Implementations must be safe to
/// share across tasks.
pub trait TokenProvider: Send + Sync {
    fn project_token(&self) -> Result<String, OpenTokError>;
}

/// Default [`TokenProvider`]: signs project tokens with HS256 using the API secret
#[derive(Clone)]
pub struct ProjectTokenSigner {
    api_key: String,
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl fmt::Debug for ProjectTokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectTokenSigner")
            .field("api_key", &self.api_key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ProjectTokenSigner {
    pub fn new(api_key: impl Into<String>, api_secret: &str, ttl: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
            ttl,
        }
    }

    /// Sign an explicit set of claims
    pub fn sign(&self, claims: &ProjectClaims) -> Result<String, OpenTokError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign project token: {}", e);
            OpenTokError::Auth(format!("Failed to sign project token: {}", e))
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenProvider for ProjectTokenSigner {
    fn project_token(&self) -> Result<String, OpenTokError> {
        let claims = ProjectClaims::new(self.api_key.clone(), self.ttl);
        tracing::debug!(
            "Issuing project token: iss={}, jti={}, exp={}",
            claims.iss,
            claims.jti,
            claims.exp
        );
        self.sign(&claims)
    }
}

/// Verify a project token and return its claims
///
/// Checks the HS256 signature against `api_secret`, the expiry, that the
/// issuer is `api_key` and that the token is project scoped.
pub fn decode_project_token(
    token: &str,
    api_key: &str,
    api_secret: &str,
) -> Result<ProjectClaims, OpenTokError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[api_key]);

    let claims = decode::<ProjectClaims>(
        token,
        &DecodingKey::from_secret(api_secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.ist != PROJECT_TOKEN_SCOPE {
        return Err(OpenTokError::Auth(format!(
            "Token is not project scoped: ist={}",
            claims.ist
        )));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_KEY: &str = "12345678";
    const API_SECRET: &str = "ba7816bf8f01cfea414140de5dae2223b00361a3";

    #[test]
    fn test_project_claims_shape() {
        let claims = ProjectClaims::new(API_KEY, Duration::from_secs(300));
        assert_eq!(claims.iss, API_KEY);
        assert_eq!(claims.ist, "project");
        assert_eq!(claims.exp - claims.iat, 300);
        assert!(uuid::Uuid::parse_str(&claims.jti).is_ok());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_project_token_verifies_with_secret() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let token = signer.project_token().unwrap();

        let claims = decode_project_token(&token, API_KEY, API_SECRET).unwrap();
        assert_eq!(claims.iss, API_KEY);
        assert_eq!(claims.ist, PROJECT_TOKEN_SCOPE);
    }

    #[test]
    fn test_project_token_rejected_with_wrong_secret() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let token = signer.project_token().unwrap();

        let result = decode_project_token(&token, API_KEY, "some-other-secret");
        assert!(matches!(result, Err(OpenTokError::Auth(_))));
    }

    #[test]
    fn test_project_token_rejected_for_other_issuer() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let token = signer.project_token().unwrap();

        let result = decode_project_token(&token, "87654321", API_SECRET);
        assert!(matches!(result, Err(OpenTokError::Auth(_))));
    }

    #[test]
    fn test_session_scoped_token_rejected() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let mut claims = ProjectClaims::new(API_KEY, Duration::from_secs(300));
        claims.ist = "account".to_string();
        let token = signer.sign(&claims).unwrap();

        let err = decode_project_token(&token, API_KEY, API_SECRET).unwrap_err();
        assert!(err.to_string().contains("not project scoped"));
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let first = decode_project_token(&signer.project_token().unwrap(), API_KEY, API_SECRET)
            .unwrap();
        let second = decode_project_token(&signer.project_token().unwrap(), API_KEY, API_SECRET)
            .unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_signer_debug_hides_secret() {
        let signer = ProjectTokenSigner::new(API_KEY, API_SECRET, Duration::from_secs(300));
        let debug = format!("{:?}", signer);
        assert!(debug.contains(API_KEY));
        assert!(!debug.contains(API_SECRET));
    }
}
