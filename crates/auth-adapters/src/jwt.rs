//! HS256 JSON Web Tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use domains::{DomainError, IssuedToken, Result, Role, TokenClaims, TokenService, User, UserId};

pub const DEFAULT_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn with_ttl_hours(secret: &[u8], hours: i64) -> Self {
        Self::new(secret, Duration::hours(hours))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            DomainError::server("token signing failed")
        })?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::unauthorized("token expired"),
                _ => DomainError::unauthorized("invalid token"),
            }
        })?;
        let claims = data.claims;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| DomainError::unauthorized("invalid token"))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| DomainError::unauthorized("invalid token"))?;
        Ok(TokenClaims {
            user_id,
            role: claims.role,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Location, NewUser, PasswordHash, Preferences};

    fn user(role: Role) -> User {
        User::register(
            NewUser {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: PasswordHash::new("$argon2id$stub"),
                role,
                phone: None,
                location: Location::default(),
                bio: None,
                preferences: Preferences::default(),
                is_verified: false,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn issued_tokens_verify_back_to_the_user() {
        let service = JwtTokenService::with_ttl_hours(b"test-secret", DEFAULT_TTL_HOURS);
        let admin = user(Role::Admin);

        let issued = service.issue(&admin).unwrap();
        let claims = service.verify(&issued.token).unwrap();

        assert_eq!(claims.user_id, admin.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
        assert!(issued.expires_at > Utc::now() + Duration::days(6));
    }

    #[test]
    fn expired_tokens_are_unauthorized() {
        let service = JwtTokenService::with_ttl_hours(b"test-secret", -2);
        let issued = service.issue(&user(Role::User)).unwrap();

        let err = service.verify(&issued.token).unwrap_err();
        assert_eq!(err, DomainError::unauthorized("token expired"));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = JwtTokenService::with_ttl_hours(b"one", 1);
        let verifier = JwtTokenService::with_ttl_hours(b"two", 1);
        let issued = issuer.issue(&user(Role::User)).unwrap();

        assert!(matches!(
            verifier.verify(&issued.token),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            verifier.verify("garbage"),
            Err(DomainError::Unauthorized(_))
        ));
    }
}
