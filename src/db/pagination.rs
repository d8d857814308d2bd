//! Offset/limit pagination helper shared by every list query.

use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, SelectorTrait};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "isFirstPage")]
    pub is_first_page: bool,
    #[serde(rename = "isLastPage")]
    pub is_last_page: bool,
}

impl PageMeta {
    #[must_use]
    pub const fn new(total: u64, total_pages: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages,
            is_first_page: page <= 1,
            is_last_page: page >= total_pages,
        }
    }
}

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Fetches one page of `query`, 1-based `page`.
pub async fn fetch_page<'db, C, P, S>(
    query: P,
    conn: &'db C,
    page: u64,
    limit: u64,
) -> Result<Page<S::Item>, DbErr>
where
    C: ConnectionTrait,
    P: PaginatorTrait<'db, C, Selector = S>,
    S: SelectorTrait + Send + Sync + 'db,
{
    let page = page.max(1);
    let limit = limit.max(1);

    let paginator = query.paginate(conn, limit);
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        items,
        meta: PageMeta::new(counts.number_of_items, counts.number_of_pages, page, limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_page_flags() {
        // 15 rows, limit 10: page 1 is first but not last, page 2 is last.
        let meta = PageMeta::new(15, 2, 1, 10);
        assert!(meta.is_first_page);
        assert!(!meta.is_last_page);

        let meta = PageMeta::new(15, 2, 2, 10);
        assert!(!meta.is_first_page);
        assert!(meta.is_last_page);
    }

    #[test]
    fn empty_result_is_both_first_and_last() {
        let meta = PageMeta::new(0, 0, 1, 10);
        assert!(meta.is_first_page);
        assert!(meta.is_last_page);
    }
}
