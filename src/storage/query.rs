//! Item query model and its SQL rendering
//!
//! Filters combine with AND. Sort fields are a closed set, so user input never
//! reaches the SQL text; every value is bound as a parameter.

use rusqlite::types::Value;
use serde::Serialize;

/// Default page size for item listings
pub const DEFAULT_LIMIT: u32 = 12;
/// Largest page size a caller may request
pub const MAX_LIMIT: u32 = 100;

/// Field filters for item queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Substring match on the title
    ///
    /// Matching uses SQLite `LIKE`, which folds case for ASCII letters only:
    /// `"the"` finds `"The"`, but `"é"` does not find `"É"`.
    pub search: Option<String>,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
}

impl ItemFilter {
    /// Renders the filter as a WHERE clause (empty when unfiltered) plus its
    /// bound values, in placeholder order
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push("title LIKE ? ESCAPE '\\'");
            values.push(Value::Text(format!("%{}%", escape_like(search))));
        }

        if let Some(min) = self.min_rating {
            clauses.push("rating >= ?");
            values.push(Value::Integer(i64::from(min)));
        }

        if let Some(max) = self.max_rating {
            clauses.push("rating <= ?");
            values.push(Value::Integer(i64::from(max)));
        }

        if let Some(min) = self.min_price {
            clauses.push("price >= ?");
            values.push(Value::Real(min));
        }

        if let Some(max) = self.max_price {
            clauses.push("price <= ?");
            values.push(Value::Real(max));
        }

        if let Some(in_stock) = self.in_stock {
            clauses.push("in_stock = ?");
            values.push(Value::Integer(i64::from(in_stock)));
        }

        let clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        (clause, values)
    }
}

/// Escapes LIKE wildcards so the search text matches literally
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Sortable item fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Title,
    Price,
    Rating,
    ScrapedAt,
}

impl SortField {
    /// Parses the API name of a field
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "scrapedAt" => Some(Self::ScrapedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Rating => "rating",
            Self::ScrapedAt => "scraped_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A filtered, sorted, paginated item query
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            filter: ItemFilter::default(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ItemQuery {
    /// Number of rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }

    /// Renders the ORDER BY / LIMIT / OFFSET tail
    ///
    /// Ties are broken by id so page boundaries are stable.
    pub(crate) fn tail_sql(&self) -> String {
        format!(
            " ORDER BY {} {}, id ASC LIMIT {} OFFSET {}",
            self.sort_by.column(),
            self.sort_order.keyword(),
            self.limit,
            self.offset()
        )
    }
}

/// Pagination metadata returned alongside a page of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_items.div_ceil(u64::from(limit));
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }
}
