//! URL handling module for Catalog-Sync
//!
//! The listing site uses two path layouts: the first page lives at the site
//! root and links relative to it, while later pages live under `catalogue/`
//! and link with `../` prefixes. This module builds page URLs and turns the
//! page-relative links found on them into absolute URLs.

mod page;
mod resolve;

pub use page::page_url;
pub use resolve::{resolve_link, LinkKind};

/// Directory holding every page after the first, and every detail page
pub const CATALOGUE_DIR: &str = "catalogue";

/// Strips trailing slashes so paths can be appended with a single `/`
fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
