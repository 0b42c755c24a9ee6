use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Member, MemberId};
use crate::ports::{CredentialError, IssuedToken, TokenClaims, TokenIssuer, TokenKind};

/// JWT Claims for member tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemberClaims {
    sub: String,
    name: String,
    token_type: TokenKind,
    iss: String,
    iat: i64,
    exp: i64,
}

/// HS256 JWT issuer
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &str, issuer: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            access_ttl,
            refresh_ttl,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, member: &Member, kind: TokenKind) -> Result<IssuedToken, CredentialError> {
        let now = Utc::now();
        let expires_at = now + self.ttl(kind);

        let claims = MemberClaims {
            sub: member.member_id.value().to_string(),
            name: member.name.clone(),
            token_type: kind,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::Backend(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<MemberClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                CredentialError::Invalid
            })?
            .claims;

        if claims.token_type != kind {
            tracing::debug!(expected = ?kind, actual = ?claims.token_type, "token type mismatch");
            return Err(CredentialError::Invalid);
        }

        let member_id = Uuid::parse_str(&claims.sub)
            .map(MemberId::from_uuid)
            .map_err(|_| CredentialError::Invalid)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(CredentialError::Invalid)?;

        Ok(TokenClaims {
            member_id,
            name: claims.name,
            kind: claims.token_type,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> JwtIssuer {
        JwtIssuer::new("test-secret", "library", Duration::hours(1), Duration::hours(3))
    }

    fn member() -> Member {
        Member::new("M001".to_string(), "Angga".to_string(), "hash".to_string())
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let issuer = issuer();
        let member = member();

        let issued = issuer.issue(&member, TokenKind::Access).unwrap();
        let claims = issuer.verify(&issued.token, TokenKind::Access).unwrap();

        assert_eq!(claims.member_id, member.member_id);
        assert_eq!(claims.name, "Angga");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_refresh_token_lives_longer() {
        let issuer = issuer();
        let member = member();

        let access = issuer.issue(&member, TokenKind::Access).unwrap();
        let refresh = issuer.issue(&member, TokenKind::Refresh).unwrap();
        assert!(refresh.expires_at > access.expires_at);
    }

    #[test]
    fn test_verify_rejects_wrong_token_type() {
        let issuer = issuer();
        let access = issuer.issue(&member(), TokenKind::Access).unwrap();

        let result = issuer.verify(&access.token, TokenKind::Refresh);
        assert!(matches!(result, Err(CredentialError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = issuer().issue(&member(), TokenKind::Access).unwrap().token;
        let other = JwtIssuer::new("other-secret", "library", Duration::hours(1), Duration::hours(3));

        assert!(matches!(
            other.verify(&token, TokenKind::Access),
            Err(CredentialError::Invalid)
        ));
    }

    #[test]
    fn test_verify_rejects_other_issuer() {
        let token = issuer().issue(&member(), TokenKind::Access).unwrap().token;
        let other = JwtIssuer::new("test-secret", "someone-else", Duration::hours(1), Duration::hours(3));

        assert!(other.verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // 既定の許容誤差（60秒）より前に失効させる
        let expired = JwtIssuer::new("test-secret", "library", Duration::minutes(-5), Duration::hours(3));
        let token = expired.issue(&member(), TokenKind::Access).unwrap().token;

        assert!(matches!(
            issuer().verify(&token, TokenKind::Access),
            Err(CredentialError::Invalid)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(issuer().verify("not.a.token", TokenKind::Access).is_err());
    }
}
