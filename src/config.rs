use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 托管认证服务 (Supabase Auth / GoTrue)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// 项目地址，例如 https://xyzcompany.supabase.co
    pub url: String,
    /// 匿名 API key (apikey header)
    pub anon_key: String,
    /// 项目 JWT secret，用于本地校验 access token
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// 管理员邮箱白名单；为空表示任何已登录用户都视为管理员
    #[serde(default)]
    pub emails: Vec<String>,
}

/// 解析逗号分隔的邮箱列表：按逗号切分、去除首尾空白、丢弃空串
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    supabase: SupabaseConfig {
                        url: get_env("SUPABASE_URL").unwrap_or_default(),
                        anon_key: get_env("SUPABASE_ANON_KEY").unwrap_or_default(),
                        jwt_secret: get_env("SUPABASE_JWT_SECRET").unwrap_or_default(),
                    },
                    admin: AdminConfig {
                        emails: get_env("ADMIN_EMAILS")
                            .map(|v| parse_email_list(&v))
                            .unwrap_or_default(),
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SUPABASE_URL") {
            config.supabase.url = v;
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY") {
            config.supabase.anon_key = v;
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            config.supabase.jwt_secret = v;
        }
        if let Ok(v) = env::var("ADMIN_EMAILS") {
            config.admin.emails = parse_email_list(&v);
        }

        // 文件中的列表同样做一次清洗
        config.admin.emails = config
            .admin
            .emails
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(config)
    }

    /// 启动前检查必填项
    pub fn validate(&self) -> Result<(), AppError> {
        if self.supabase.jwt_secret.trim().is_empty() {
            return Err(AppError::ConfigError(
                "SUPABASE_JWT_SECRET 未配置，无法校验管理员令牌".to_string(),
            ));
        }
        if self.supabase.url.trim().is_empty() || self.supabase.anon_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "SUPABASE_URL / SUPABASE_ANON_KEY 未配置".to_string(),
            ));
        }
        Ok(())
    }
}
