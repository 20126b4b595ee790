//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entry::EntryResponse;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

impl PaginationParams {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    /// 页码从 1 开始；0 或负数视为第一页
    pub fn get_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// 按请求的数量取窗口，不设上限；0 或负数按 1 处理
    pub fn get_page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// 行窗口起点: max(0, (page - 1) * page_size)
    pub fn get_offset(&self) -> i64 {
        let page = self.page.unwrap_or(1);
        page.saturating_sub(1)
            .saturating_mul(self.get_page_size())
            .max(0)
    }

    pub fn get_limit(&self) -> i64 {
        self.get_page_size()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(PaginatedEntries = PaginatedResponse<EntryResponse>)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    /// 筛选后的总条数
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = (total + page_size - 1) / page_size;
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}
