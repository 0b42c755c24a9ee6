use serde::{Deserialize, Serialize};

/// 1ページあたりの既定件数
pub const DEFAULT_LIMIT: u32 = 10;
/// 1ページあたりの最大件数
pub const MAX_LIMIT: u32 = 100;

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 書籍一覧の並び替え項目
///
/// SQLへ埋め込む列名はこの列挙で固定する（利用者の入力を直接埋め込まない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSortField {
    #[default]
    Code,
    Title,
    Author,
    Stock,
}

impl BookSortField {
    pub fn column(&self) -> &'static str {
        match self {
            BookSortField::Code => "code",
            BookSortField::Title => "title",
            BookSortField::Author => "author",
            BookSortField::Stock => "stock",
        }
    }
}

/// 会員一覧の並び替え項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSortField {
    #[default]
    Code,
    Name,
}

impl MemberSortField {
    pub fn column(&self) -> &'static str {
        match self {
            MemberSortField::Code => "code",
            MemberSortField::Name => "name",
        }
    }
}

/// ページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F> {
    page: u32,
    limit: u32,
    pub sort_by: F,
    pub order: SortOrder,
}

impl<F: Default> Default for PageRequest<F> {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            sort_by: F::default(),
            order: SortOrder::default(),
        }
    }
}

impl<F> PageRequest<F> {
    /// ページ番号は1始まり。0は1に、件数は1..=MAX_LIMITに丸める。
    pub fn new(page: Option<u32>, limit: Option<u32>, sort_by: F, order: SortOrder) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort_by,
            order,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// ページング情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub limit: u32,
    pub total_data: u64,
    pub total_page: u64,
}

impl Pagination {
    pub fn new<F>(request: &PageRequest<F>, total_data: u64) -> Self {
        let limit = u64::from(request.limit());
        Self {
            current_page: request.page(),
            limit: request.limit(),
            total_data,
            total_page: total_data.div_ceil(limit),
        }
    }
}

/// ページ単位の取得結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request: PageRequest<BookSortField> = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_LIMIT);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.sort_by, BookSortField::Code);
        assert_eq!(request.order, SortOrder::Asc);
    }

    #[test]
    fn test_page_request_clamps_input() {
        let request = PageRequest::new(Some(0), Some(1000), MemberSortField::Name, SortOrder::Desc);
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), MAX_LIMIT);

        let request = PageRequest::new(Some(3), Some(0), MemberSortField::Name, SortOrder::Desc);
        assert_eq!(request.limit(), 1);
        assert_eq!(request.offset(), 2);
    }

    #[test]
    fn test_pagination_total_page_rounds_up() {
        let request = PageRequest::new(Some(2), Some(10), BookSortField::Title, SortOrder::Asc);
        let pagination = Pagination::new(&request, 21);
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_page, 3);

        let pagination = Pagination::new(&request, 0);
        assert_eq!(pagination.total_page, 0);
    }

    #[test]
    fn test_sort_field_deserializes_lowercase() {
        let field: BookSortField = serde_json::from_str("\"author\"").unwrap();
        assert_eq!(field.column(), "author");

        // 未知の列名は受け付けない
        let field: Result<BookSortField, _> = serde_json::from_str("\"password\"");
        assert!(field.is_err());
    }
}
