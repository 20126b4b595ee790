use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// 校验邮箱格式（只做基本形态检查，真实性交给认证服务）
pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError("Email 格式無效".to_string()));
    }

    Ok(())
}
