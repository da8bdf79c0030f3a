use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const REFRESH_COOKIE: &str = "refresh_token";

/// 令牌用途，校验时必须与预期一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    pub role: String,
    pub token_type: TokenKind,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(user_id: i64, role: &str, kind: TokenKind, ttl: chrono::TimeDelta) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: kind,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    fn expect_kind(self, kind: TokenKind) -> Result<Self, JwtError> {
        if self.token_type == kind {
            Ok(self)
        } else {
            Err(ErrorKind::InvalidToken.into())
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    pub fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }

    fn issue(
        user_id: i64,
        role: &str,
        kind: TokenKind,
        ttl: chrono::TimeDelta,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, role, kind, ttl);
        Self::encode_with_secret(&claims, &AppConfig::get().jwt.secret)
    }

    fn verify(token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        Self::decode_with_secret(token, &AppConfig::get().jwt.secret)?.expect_kind(kind)
    }

    /// 有效期 `jwt.access_token_expiry` 分钟
    pub fn generate_access_token(user_id: i64, role: &str) -> Result<String, JwtError> {
        let minutes = AppConfig::get().jwt.access_token_expiry;
        Self::issue(user_id, role, TokenKind::Access, chrono::TimeDelta::minutes(minutes))
    }

    /// 有效期 `jwt.reset_token_expiry` 秒
    pub fn generate_reset_token(user_id: i64, role: &str) -> Result<String, JwtError> {
        let seconds = AppConfig::get().jwt.reset_token_expiry;
        Self::issue(user_id, role, TokenKind::Reset, chrono::TimeDelta::seconds(seconds))
    }

    /// `refresh_ttl` 为空时使用 `jwt.refresh_token_expiry` 天
    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        refresh_ttl: Option<chrono::TimeDelta>,
    ) -> Result<TokenPair, JwtError> {
        let refresh_ttl = refresh_ttl
            .unwrap_or_else(|| chrono::TimeDelta::days(AppConfig::get().jwt.refresh_token_expiry));

        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, role)?,
            refresh_token: Self::issue(user_id, role, TokenKind::Refresh, refresh_ttl)?,
        })
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Refresh)
    }

    pub fn verify_reset_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Reset)
    }

    fn refresh_cookie(value: String, max_age: CookieDuration) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, value)
            .path("/")
            .max_age(max_age)
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    /// 勾选“记住我”时使用更长的有效期
    pub fn create_refresh_token_cookie(refresh_token: &str, remember_me: bool) -> Cookie<'static> {
        let jwt = &AppConfig::get().jwt;
        let days = if remember_me {
            jwt.refresh_token_remember_me_expiry
        } else {
            jwt.refresh_token_expiry
        };
        Self::refresh_cookie(refresh_token.to_string(), CookieDuration::days(days))
    }

    /// 注销时下发的过期 Cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::refresh_cookie(String::new(), CookieDuration::ZERO)
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_claims_survive_encoding() {
        let claims = Claims::new(42, "staff", TokenKind::Access, chrono::TimeDelta::minutes(5));
        let token = JwtUtils::encode_with_secret(&claims, SECRET).unwrap();
        let decoded = JwtUtils::decode_with_secret(&token, SECRET).unwrap();

        assert_eq!(decoded.user_id(), Some(42));
        assert_eq!(decoded.role, "staff");
        assert_eq!(decoded.token_type, TokenKind::Access);
    }

    #[test]
    fn test_token_kind_serialized_lowercase() {
        let claims = Claims::new(1, "user", TokenKind::Reset, chrono::TimeDelta::minutes(5));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["token_type"], "reset");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(1, "admin", TokenKind::Access, chrono::TimeDelta::minutes(5));
        let token = JwtUtils::encode_with_secret(&claims, SECRET).unwrap();
        assert!(JwtUtils::decode_with_secret(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::new(1, "user", TokenKind::Reset, chrono::TimeDelta::hours(-2));
        let token = JwtUtils::encode_with_secret(&claims, SECRET).unwrap();
        assert!(JwtUtils::decode_with_secret(&token, SECRET).is_err());
    }

    #[test]
    fn test_token_kind_mismatch() {
        let claims = Claims::new(1, "user", TokenKind::Refresh, chrono::TimeDelta::days(1));
        assert!(claims.clone().expect_kind(TokenKind::Reset).is_err());
        assert!(claims.expect_kind(TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_non_numeric_subject() {
        let mut claims = Claims::new(1, "user", TokenKind::Access, chrono::TimeDelta::days(1));
        claims.sub = "admin".into();
        assert_eq!(claims.user_id(), None);
    }
}
