use crate::entities::entry_entity as entries;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateEntryRequest, EntryFilter, EntryQuery, EntryResponse, PaginatedResponse,
    PaginationParams,
};
use crate::utils::{parse_timestamp, start_of_today};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 记录日志后原样向上抛出存储层错误
fn store_error(context: &'static str) -> impl Fn(DbErr) -> AppError {
    move |e| {
        log::error!("{context}: {e}");
        AppError::DatabaseError(e)
    }
}

/// LIKE 模式中的通配符按字面匹配
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 把可选筛选条件依次折叠成一个 AND 条件
pub fn filter_condition(filter: &EntryFilter) -> Condition {
    let predicates: [Option<SimpleExpr>; 4] = [
        filter.search.as_ref().map(|s| {
            let pattern = format!("%{}%", escape_like(&s.to_lowercase()));
            Expr::expr(Func::lower(Expr::col(entries::Column::Username)))
                .like(LikeExpr::new(pattern).escape('\\'))
        }),
        filter
            .amount
            .as_ref()
            .map(|a| entries::Column::Amount.eq(a.clone())),
        filter
            .date_from
            .map(|from| entries::Column::Timestamp.gte(from)),
        filter.date_to.map(|to| entries::Column::Timestamp.lte(to)),
    ];

    predicates
        .into_iter()
        .flatten()
        .fold(Condition::all(), |cond, p| cond.add(p))
}

#[derive(Clone)]
pub struct EntryService {
    pool: Arc<DatabaseConnection>,
}

impl EntryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// 新增一条记录
    pub async fn save_entry(&self, request: CreateEntryRequest) -> AppResult<EntryResponse> {
        let id = match request.id {
            Some(id) if id.trim().is_empty() => {
                return Err(AppError::ValidationError("Entry id must not be empty".into()));
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        let timestamp = parse_timestamp(&request.timestamp)?;
        if !request.prize.is_finite() {
            return Err(AppError::ValidationError("Prize must be a finite number".into()));
        }

        let model = entries::ActiveModel {
            id: Set(id),
            timestamp: Set(timestamp),
            username: Set(request.username),
            amount: Set(request.amount),
            image: Set(request.image),
            prize: Set(request.prize),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(store_error("Error saving entry"))?;

        Ok(model.into())
    }

    /// 全部记录，按 timestamp 倒序
    pub async fn get_entries(&self) -> AppResult<Vec<EntryResponse>> {
        let list = entries::Entity::find()
            .order_by_desc(entries::Column::Timestamp)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error("Error fetching entries"))?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 分页 + 筛选
    ///
    /// total 为筛选后的总数；超出范围的页返回空列表
    pub async fn get_entries_paged(
        &self,
        query: &EntryQuery,
    ) -> AppResult<PaginatedResponse<EntryResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let filter = EntryFilter::try_from(query)?;

        let base_query = entries::Entity::find().filter(filter_condition(&filter));

        let total = base_query
            .clone()
            .count(self.pool.as_ref())
            .await
            .map_err(store_error("Error counting paged entries"))? as i64;

        let items = base_query
            .order_by_desc(entries::Column::Timestamp)
            .order_by_desc(entries::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error("Error fetching paged entries"))?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 删除单条记录；id 不存在时同样视为成功
    pub async fn delete_entry(&self, id: &str) -> AppResult<bool> {
        let result = entries::Entity::delete_by_id(id.to_string())
            .exec(self.pool.as_ref())
            .await
            .map_err(store_error("Error deleting entry"))?;

        if result.rows_affected == 0 {
            log::debug!("Delete entry {id}: no matching row");
        }
        Ok(true)
    }

    /// 清空全部记录（无条件删除）
    pub async fn clear_all_entries(&self) -> AppResult<bool> {
        let result = entries::Entity::delete_many()
            .exec(self.pool.as_ref())
            .await
            .map_err(store_error("Error clearing entries"))?;

        log::info!("Cleared {} entries", result.rows_affected);
        Ok(true)
    }

    /// 今天（服务器本地时区零点起）的记录，倒序
    pub async fn get_today_entries(&self) -> AppResult<Vec<EntryResponse>> {
        let list = entries::Entity::find()
            .filter(entries::Column::Timestamp.gte(start_of_today()))
            .order_by_desc(entries::Column::Timestamp)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error("Error fetching today entries"))?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 今天的记录数。仅用于展示，查询失败时返回 0 而不报错
    pub async fn get_today_count(&self) -> u64 {
        match entries::Entity::find()
            .filter(entries::Column::Timestamp.gte(start_of_today()))
            .count(self.pool.as_ref())
            .await
        {
            Ok(count) => count,
            Err(e) => {
                log::error!("Error counting today entries: {e}");
                0
            }
        }
    }
}
