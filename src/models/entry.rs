use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::entry_entity;
use crate::error::{AppError, AppResult};
use crate::utils::parse_timestamp;

/// 金额筛选的“全部”哨兵值
pub const AMOUNT_ALL: &str = "all";

/// 新增记录请求（created_at 由数据库写入，不接受调用方提供）
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateEntryRequest {
    /// 可选；未提供时由服务端生成 UUID
    #[schema(example = "1714550400000")]
    pub id: Option<String>,
    /// ISO 8601 时间
    #[schema(example = "2024-05-01T12:00:00+08:00")]
    pub timestamp: String,
    #[schema(example = "Joanna")]
    pub username: String,
    #[schema(example = "1000")]
    pub amount: String,
    #[serde(default)]
    #[schema(example = "https://cdn.example.com/receipts/1.png")]
    pub image: String,
    #[schema(example = 888.0)]
    pub prize: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub amount: String,
    pub image: String,
    pub prize: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<entry_entity::Model> for EntryResponse {
    fn from(m: entry_entity::Model) -> Self {
        EntryResponse {
            id: m.id,
            timestamp: m.timestamp,
            username: m.username,
            amount: m.amount,
            image: m.image,
            prize: m.prize,
            created_at: m.created_at,
        }
    }
}

/// 后台记录分页查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EntryQuery {
    /// 页码 (默认 1)
    pub page: Option<i64>,
    /// 每页数量 (默认 20)
    pub page_size: Option<i64>,
    /// 用户名模糊搜索（不区分大小写）
    pub search: Option<String>,
    /// 金额精确筛选；"all" 表示不筛选
    pub amount: Option<String>,
    /// timestamp 下界（含）
    pub date_from: Option<String>,
    /// timestamp 上界（含）
    pub date_to: Option<String>,
}

/// 规范化后的筛选条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub search: Option<String>,
    pub amount: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl TryFrom<&EntryQuery> for EntryFilter {
    type Error = AppError;

    fn try_from(query: &EntryQuery) -> AppResult<Self> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let amount = query
            .amount
            .as_deref()
            .filter(|a| !a.is_empty() && *a != AMOUNT_ALL)
            .map(str::to_string);

        let date_from = non_empty(&query.date_from).map(parse_timestamp).transpose()?;
        let date_to = non_empty(&query.date_to).map(parse_timestamp).transpose()?;

        Ok(EntryFilter {
            search,
            amount,
            date_from,
            date_to,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteEntryResponse {
    pub deleted: bool,
}
