use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Issues and verifies signed, time-limited HS256 bearer tokens.
///
/// Tokens are stateless: there is no revocation list, and a token stays
/// valid until its encoded expiry regardless of server-side events.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `subject` expiring after the configured ttl.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(subject, self.ttl)
    }

    /// Issue a token with an explicit ttl. A non-positive ttl produces an
    /// already-expired token.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now() + ttl;
        let claims = Claims {
            sub: subject.to_owned(),
            exp: expires_at.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns the token's subject, or `None` for any invalid token.
    /// Signature, shape, and expiry failures are deliberately
    /// indistinguishable.
    pub fn verify(&self, token: &str) -> Option<String> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::minutes(30))
    }

    #[test]
    fn issued_token_verifies_to_its_subject() {
        let tokens = service();
        let token = tokens.issue("admin").unwrap();

        assert_eq!(tokens.verify(&token).as_deref(), Some("admin"));
    }

    #[test]
    fn expired_token_is_invalid() {
        let tokens = service();
        let token = tokens.issue_with_ttl("admin", Duration::minutes(-5)).unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = service();
        let mut token = tokens.issue("admin").unwrap();
        token.push('x');

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = TokenService::new(b"other-secret", Duration::minutes(30));
        let token = other.issue("admin").unwrap();

        assert_eq!(service().verify(&token), None);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(service().verify("not.a.token"), None);
        assert_eq!(service().verify(""), None);
    }
}
