//! Item records produced by a crawl
//!
//! An [`Item`] is the unit the extractor produces and the store persists. Its
//! stock fields are both projections of a single [`StockStatus`], so the
//! display string and the boolean can never disagree.

mod price;
mod rating;

pub use price::parse_price;
pub use rating::Rating;

use chrono::{DateTime, Utc};
use std::fmt;

/// Display string for items that can be bought
pub const IN_STOCK: &str = "In stock";
/// Display string for items that cannot be bought
pub const OUT_OF_STOCK: &str = "Out of stock";

/// Availability of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// Derives availability from the class list of the availability marker
    ///
    /// Only the exact `instock` token counts; `outofstock` or a missing token
    /// means the item is unavailable.
    pub fn from_class_list(classes: &str) -> Self {
        if classes.split_whitespace().any(|token| token == "instock") {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    /// Returns the display string stored as `stockAvailability`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => IN_STOCK,
            Self::OutOfStock => OUT_OF_STOCK,
        }
    }

    /// Returns the boolean stored as `inStock`
    pub fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }

    pub fn from_display(s: &str) -> Option<Self> {
        match s {
            IN_STOCK => Some(Self::InStock),
            OUT_OF_STOCK => Some(Self::OutOfStock),
            _ => None,
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub price: f64,
    pub stock: StockStatus,
    pub rating: Rating,
    pub detail_page_url: String,
    pub thumbnail_url: String,
    pub scraped_at: DateTime<Utc>,
}

impl Item {
    pub fn stock_availability(&self) -> &'static str {
        self.stock.as_str()
    }

    pub fn in_stock(&self) -> bool {
        self.stock.is_in_stock()
    }

    /// Compares every field except `scraped_at`
    ///
    /// Two crawls of an unchanged source produce items that are equal under
    /// this comparison.
    pub fn same_listing(&self, other: &Item) -> bool {
        self.title == other.title
            && self.price == other.price
            && self.stock == other.stock
            && self.rating == other.rating
            && self.detail_page_url == other.detail_page_url
            && self.thumbnail_url == other.thumbnail_url
    }
}
