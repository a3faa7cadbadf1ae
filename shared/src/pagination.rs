//! 分页列表
//!
//! `Paginator` 是分页组件背后的纯状态机：每次请求领取一个 `FetchTicket`，
//! 只有最新签发的 ticket 能写回结果，旧响应被丢弃。
//! 成功时整体替换游标，失败时清空列表，避免新页码旁显示旧数据。

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =========================================================
// 请求参数
// =========================================================

/// 分页请求（页码从 0 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    /// `size` 为 0 时按 1 处理
    pub fn new(index: u32, size: u32) -> Self {
        Self {
            index,
            size: size.max(1),
        }
    }

    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    pub fn offset(&self) -> usize {
        self.index as usize * self.size as usize
    }

    pub fn to_query(&self, style: PageParamStyle) -> Vec<(String, String)> {
        let (page_key, size_key) = style.keys();
        vec![
            (page_key.to_string(), self.index.to_string()),
            (size_key.to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// 分页参数命名约定，由各端点自行声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageParamStyle {
    /// `?page=&size=`
    PageSize,
    /// `?pageNo=&pageSize=`
    PageNoPageSize,
}

impl PageParamStyle {
    pub fn keys(&self) -> (&'static str, &'static str) {
        match self {
            PageParamStyle::PageSize => ("page", "size"),
            PageParamStyle::PageNoPageSize => ("pageNo", "pageSize"),
        }
    }
}

// =========================================================
// 服务器分页结果
// =========================================================

/// 一页数据
///
/// 兼容常见的几种服务器字段命名。服务器未给出总数时 `total` 为 `None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "content", alias = "data", alias = "list", alias = "records")]
    pub items: Vec<T>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "totalElements",
        alias = "totalItems",
        alias = "totalCount"
    )]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total: Some(total),
        }
    }

    /// 总数未知的一页
    pub fn open_ended(items: Vec<T>) -> Self {
        Self { items, total: None }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl<T: Clone> Page<T> {
    /// 从完整列表中切出一页（用于返回整表的端点）
    pub fn from_slice(all: &[T], request: PageRequest) -> Self {
        let items = all
            .iter()
            .skip(request.offset())
            .take(request.size as usize)
            .cloned()
            .collect();
        Self::new(items, all.len() as u64)
    }
}

// =========================================================
// 游标
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PageCursor<T> {
    pub page_index: u32,
    pub page_size: u32,
    /// 总数未知时为已见过的条数
    pub total_items: u64,
    /// 总数未知且本页已满，后面可能还有数据
    pub maybe_more: bool,
    pub items: Vec<T>,
}

impl<T> PageCursor<T> {
    pub fn empty(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            total_items: 0,
            maybe_more: false,
            items: Vec::new(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(self.page_size as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.maybe_more || self.page_index + 1 < self.total_pages()
    }
}

// =========================================================
// 状态机
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(ClientError),
}

/// 单次请求凭证
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginator<T> {
    cursor: PageCursor<T>,
    state: LoadState,
    generation: u64,
}

impl<T> Paginator<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            cursor: PageCursor::empty(0, page_size),
            state: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn cursor(&self) -> &PageCursor<T> {
        &self.cursor
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        &self.cursor.items
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// 开始加载指定页，之前签发的 ticket 全部失效
    pub fn begin(&mut self, index: u32) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.cursor.page_index = index;
        FetchTicket {
            generation: self.generation,
            request: PageRequest::new(index, self.cursor.page_size),
        }
    }

    /// 写回结果；返回 false 表示 ticket 已过期，结果被丢弃
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Page<T>, ClientError>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        match result {
            Ok(page) => {
                let request = ticket.request;
                let (total_items, maybe_more) = match page.total {
                    Some(total) => (total, false),
                    None => {
                        let seen = request.offset() as u64 + page.items.len() as u64;
                        (seen, page.items.len() >= request.size as usize)
                    }
                };
                self.cursor = PageCursor {
                    page_index: request.index,
                    page_size: request.size,
                    total_items,
                    maybe_more,
                    items: page.items,
                };
                self.state = LoadState::Ready;
            }
            Err(e) => {
                self.cursor = PageCursor::empty(ticket.request.index, ticket.request.size);
                self.state = LoadState::Failed(e);
            }
        }
        true
    }

    /// 依赖变化：回到第一页并作废进行中的请求
    pub fn reset(&mut self) {
        self.generation += 1;
        self.cursor = PageCursor::empty(0, self.cursor.page_size);
        self.state = LoadState::Idle;
    }

    pub fn can_previous(&self) -> bool {
        !self.is_loading() && self.cursor.has_previous()
    }

    pub fn can_next(&self) -> bool {
        !self.is_loading() && self.cursor.has_next()
    }

    pub fn can_jump(&self, index: u32) -> bool {
        !self.is_loading() && index != self.cursor.page_index && index < self.cursor.total_pages()
    }

    pub fn next_index(&self) -> Option<u32> {
        self.can_next().then(|| self.cursor.page_index + 1)
    }

    pub fn previous_index(&self) -> Option<u32> {
        self.can_previous().then(|| self.cursor.page_index - 1)
    }
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
