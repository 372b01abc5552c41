//! Signed, time-bound identity tokens.
//!
//! Tokens are HS256 JWTs carrying the user's id and role. They are verified
//! statelessly on every request; there is no server-side session store and no
//! revocation before expiry. The short default lifetime (one hour) is the
//! sole mitigation for a compromised token.

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use catalog_core::{Role, UserId};

use super::auth::AuthError;

/// The verified caller: the identity a token proves.
///
/// Immutable once attached to a request. The role is as fresh as the token's
/// issuance time; role changes take effect on re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed identity tokens.
///
/// Holds the signing secret injected at construction; there is no ambient or
/// static secret access anywhere else in the server.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: ChronoDuration,
}

impl TokenService {
    /// Create a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl: ChronoDuration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// Issue a token for an identity, expiring after the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails.
    pub fn issue(&self, identity: Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        self.issue_at(identity, now.timestamp(), (now + self.ttl).timestamp())
    }

    /// Issue a token with explicit issued-at and expiry timestamps.
    fn issue_at(&self, identity: Identity, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.id.as_i32(),
            role: identity.role,
            iat,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenEncoding(e.to_string()))
    }

    /// Verify a token and return the identity it encodes.
    ///
    /// Pure function of the token, the secret, and the current time; no side
    /// effects, no persistence lookups.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` past the encoded expiry and
    /// `AuthError::InvalidToken` for any signature or encoding failure.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(Identity {
            id: UserId::new(data.claims.sub),
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        let secret = SecretString::from("k9#mP2$vL8@qR5!wT3^nF7&hJ4*xB6%z");
        TokenService::new(&secret, Duration::from_secs(3600))
    }

    fn seller(id: i32) -> Identity {
        Identity {
            id: UserId::new(id),
            role: Role::Seller,
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let svc = service();
        for identity in [
            seller(1),
            Identity {
                id: UserId::new(42),
                role: Role::Administrator,
            },
            Identity {
                id: UserId::new(7),
                role: Role::Customer,
            },
        ] {
            let token = svc.issue(identity).unwrap();
            let verified = svc.verify(&token).unwrap();
            assert_eq!(verified, identity);
        }
    }

    #[test]
    fn test_verify_rejects_expired() {
        let svc = service();
        let now = Utc::now().timestamp();
        // Signature is valid; only the expiry has passed.
        let token = svc.issue_at(seller(1), now - 7200, now - 3600).unwrap();
        assert!(matches!(svc.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let svc = service();
        assert!(matches!(
            svc.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let svc = service();
        let other = TokenService::new(
            &SecretString::from("z6%B*x4J&h7F^n3T!w5R$q8L@v2P#m9k"),
            Duration::from_secs(3600),
        );
        let token = svc.issue(seller(1)).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let svc = service();
        let token = svc.issue(seller(1)).unwrap();
        // Flip a character in the payload segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);
        let payload = parts.get_mut(1).unwrap();
        let flipped = if payload.ends_with('A') { "B" } else { "A" };
        payload.truncate(payload.len() - 1);
        payload.push_str(flipped);
        let tampered = parts.join(".");
        assert!(matches!(svc.verify(&tampered), Err(AuthError::InvalidToken)));
    }
}
