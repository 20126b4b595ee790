use std::collections::HashSet;

use crate::config::parse_email_list;

/// 管理员邮箱白名单
///
/// 进程启动时由配置构建一次，之后只读共享。
/// 白名单为空表示不做限制：任何已通过认证的用户都可进入后台。
#[derive(Debug, Clone, Default)]
pub struct AdminAllowlist {
    emails: HashSet<String>,
}

impl AdminAllowlist {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    /// 从逗号分隔的字符串构建 (ADMIN_EMAILS)
    pub fn from_csv(raw: &str) -> Self {
        Self::new(parse_email_list(raw))
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// 判断某个已认证用户是否允许进入后台。
    /// 白名单非空时，缺少邮箱的用户一律拒绝。
    pub fn permits(&self, email: Option<&str>) -> bool {
        self.is_empty() || email.is_some_and(|e| self.contains(e))
    }
}
