//! Item extractor for listing pages
//!
//! Each listing page holds a sequence of `.product_pod` containers and, unless
//! it is the last page, a `.next a` pagination control. Every container must
//! yield all required fields; a container that does not fails the page rather
//! than being skipped.

use crate::item::{parse_price, Item, Rating, StockStatus};
use crate::url::{resolve_link, LinkKind};
use crate::ExtractionError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

const ITEM_CONTAINER: &str = ".product_pod";
const TITLE_LINK: &str = "h3 a";
const PRICE: &str = ".price_color";
const AVAILABILITY: &str = ".availability";
const STAR_RATING: &str = ".star-rating";
const THUMBNAIL: &str = ".thumbnail";
const NEXT_CONTROL: &str = ".next a";

/// Items and page signal extracted from one listing page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The 1-based page index the items came from
    pub page: u32,

    /// Items in document order
    pub items: Vec<Item>,

    /// Whether a "next page" control is present
    pub has_next: bool,
}

/// Compiled selectors for the listing layout
struct ListingSelectors {
    container: Selector,
    title_link: Selector,
    price: Selector,
    availability: Selector,
    star_rating: Selector,
    thumbnail: Selector,
    next_control: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            container: selector(ITEM_CONTAINER)?,
            title_link: selector(TITLE_LINK)?,
            price: selector(PRICE)?,
            availability: selector(AVAILABILITY)?,
            star_rating: selector(STAR_RATING)?,
            thumbnail: selector(THUMBNAIL)?,
            next_control: selector(NEXT_CONTROL)?,
        })
    }
}

fn selector(css: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        css,
        message: format!("{:?}", e),
    })
}

/// Parses one listing page into item records and the page signal
///
/// # Arguments
///
/// * `html` - The raw page document
/// * `page` - The 1-based page index, which selects the link resolution rules
/// * `base_url` - The site root links are resolved against
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - Every container on the page, normalized
/// * `Err(ExtractionError)` - A container was missing a required field
///
/// # Example
///
/// ```
/// use catalog_sync::crawler::extract_page;
///
/// let html = r#"<ul class="pager"><li class="next"><a href="page-2.html">next</a></li></ul>"#;
/// let page = extract_page(html, 1, "https://books.toscrape.com").unwrap();
/// assert!(page.items.is_empty());
/// assert!(page.has_next);
/// ```
pub fn extract_page(html: &str, page: u32, base_url: &str) -> Result<ExtractedPage, ExtractionError> {
    let selectors = ListingSelectors::new()?;
    let document = Html::parse_document(html);
    let scraped_at = Utc::now();

    let items = document
        .select(&selectors.container)
        .enumerate()
        .map(|(index, container)| {
            let context = ItemContext {
                page,
                position: index + 1,
                base_url,
                scraped_at,
            };
            extract_item(&selectors, container, &context)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let has_next = document.select(&selectors.next_control).next().is_some();

    Ok(ExtractedPage {
        page,
        items,
        has_next,
    })
}

/// Where an item container sits, for error reporting and link resolution
struct ItemContext<'a> {
    page: u32,
    position: usize,
    base_url: &'a str,
    scraped_at: DateTime<Utc>,
}

impl ItemContext<'_> {
    fn missing(&self, field: &'static str) -> ExtractionError {
        ExtractionError::MissingField {
            page: self.page,
            position: self.position,
            field,
        }
    }

    fn resolve(&self, relative: &str, kind: LinkKind) -> Result<String, ExtractionError> {
        resolve_link(self.base_url, self.page, relative, kind)
            .map(String::from)
            .map_err(|_| ExtractionError::InvalidUrl {
                page: self.page,
                position: self.position,
                raw: relative.to_string(),
            })
    }
}

fn extract_item(
    selectors: &ListingSelectors,
    container: ElementRef<'_>,
    ctx: &ItemContext<'_>,
) -> Result<Item, ExtractionError> {
    let title_link = container
        .select(&selectors.title_link)
        .next()
        .ok_or_else(|| ctx.missing("title"))?;

    let title = title_link
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ctx.missing("title"))?
        .to_string();

    let relative_detail = non_empty_attr(title_link, "href").ok_or_else(|| ctx.missing("detailPageUrl"))?;

    let price_text = container
        .select(&selectors.price)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| ctx.missing("price"))?;
    let price = parse_price(&price_text).ok_or_else(|| ExtractionError::InvalidPrice {
        page: ctx.page,
        position: ctx.position,
        raw: price_text.trim().to_string(),
    })?;

    let availability = container
        .select(&selectors.availability)
        .next()
        .ok_or_else(|| ctx.missing("stockAvailability"))?;
    let stock = StockStatus::from_class_list(availability.value().attr("class").unwrap_or_default());

    let rating_marker = container
        .select(&selectors.star_rating)
        .next()
        .ok_or_else(|| ctx.missing("rating"))?;
    let rating = Rating::from_class_list(rating_marker.value().attr("class").unwrap_or_default());

    let relative_thumbnail = container
        .select(&selectors.thumbnail)
        .next()
        .and_then(|el| non_empty_attr(el, "src"))
        .ok_or_else(|| ctx.missing("thumbnailUrl"))?;

    Ok(Item {
        title,
        price,
        stock,
        rating,
        detail_page_url: ctx.resolve(relative_detail, LinkKind::Detail)?,
        thumbnail_url: ctx.resolve(relative_thumbnail, LinkKind::Thumbnail)?,
        scraped_at: ctx.scraped_at,
    })
}

fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
