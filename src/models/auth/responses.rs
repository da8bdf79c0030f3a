use crate::models::users::entities::User;
use serde::Serialize;

/// 新签发的 access token，refresh token 只通过 Cookie 下发
#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// 秒
    pub expires_in: i64,
}

impl AccessToken {
    pub fn bearer(access_token: String, expiry_minutes: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_in: expiry_minutes * 60,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct TokenVerificationResponse {
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_shape() {
        let body = serde_json::to_value(AccessToken::bearer("abc".into(), 15)).unwrap();
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 900);
        assert_eq!(body["access_token"], "abc");
    }
}
