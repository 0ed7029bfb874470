use super::{trim_base, CATALOGUE_DIR};
use url::Url;

/// Builds the URL of a listing page
///
/// Page 1 is the root listing, `{base}/index.html`; page N > 1 is
/// `{base}/catalogue/page-N.html`. Page 0 is treated as page 1.
///
/// # Examples
///
/// ```
/// use catalog_sync::url::page_url;
///
/// let url = page_url("https://books.toscrape.com", 3).unwrap();
/// assert_eq!(url.as_str(), "https://books.toscrape.com/catalogue/page-3.html");
/// ```
pub fn page_url(base: &str, page: u32) -> Result<Url, url::ParseError> {
    let base = trim_base(base);
    if page <= 1 {
        Url::parse(&format!("{}/index.html", base))
    } else {
        Url::parse(&format!("{}/{}/page-{}.html", base, CATALOGUE_DIR, page))
    }
}
