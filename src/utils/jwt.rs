use crate::error::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Supabase 签发的 access token 的 audience
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// 认证服务签发的 access token 中我们关心的字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // auth user id
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// 本地校验认证服务签发的 JWT（HS256，项目 JWT secret）。
/// 本服务不签发令牌，签发由认证服务负责。
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.sub.is_empty() {
            return Err(AppError::AuthError("Invalid access token subject".to_string()));
        }
        if let Some(role) = &claims.role
            && role != AUTHENTICATED_AUDIENCE
        {
            return Err(AppError::AuthError("Invalid access token role".to_string()));
        }

        Ok(claims)
    }
}

/// 测试用：按认证服务的格式签发令牌
#[cfg(test)]
pub(crate) fn sign_test_token(secret: &str, sub: &str, email: Option<&str>, ttl_secs: i64) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now();
    let claims = serde_json::json!({
        "sub": sub,
        "email": email,
        "aud": AUTHENTICATED_AUDIENCE,
        "role": AUTHENTICATED_AUDIENCE,
        "session_id": uuid::Uuid::new_v4().to_string(),
        "iat": now.timestamp(),
        "exp": (now + Duration::seconds(ttl_secs)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "super-secret-jwt-token";

    #[test]
    fn test_verify_valid_token() {
        let service = JwtService::new(SECRET);
        let token = sign_test_token(SECRET, "user-1", Some("boss@example.com"), 3600);
        let claims = service.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("boss@example.com"));
    }

    #[test]
    fn test_reject_wrong_secret() {
        let service = JwtService::new(SECRET);
        let token = sign_test_token("other-secret", "user-1", None, 3600);
        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_reject_expired_token() {
        let service = JwtService::new(SECRET);
        let token = sign_test_token(SECRET, "user-1", None, -3600);
        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_reject_missing_audience() {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let service = JwtService::new(SECRET);
        let claims = serde_json::json!({
            "sub": "anon",
            "role": "anon",
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(service.verify_access_token(&token).is_err());
    }
}
