use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖登记记录实体
/// 说明:
/// - id 为文本主键，调用方可自带，否则由服务端生成 UUID
/// - timestamp 为记录所代表的时间点（客户端提供），所有列表按其倒序
/// - amount 为分类字符串，后台按精确值筛选
/// - created_at 由数据库在插入时写入，调用方不可提供
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[sea_orm(column_type = "Text")]
    pub username: String,
    #[sea_orm(column_type = "Text")]
    pub amount: String,
    #[sea_orm(column_type = "Text")]
    pub image: String,
    /// 奖金
    #[sea_orm(column_type = "Double")]
    pub prize: f64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
