use super::{trim_base, CATALOGUE_DIR};
use url::Url;

/// Which kind of link is being resolved
///
/// Detail pages live under `catalogue/`; thumbnails live under the site root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Detail,
    Thumbnail,
}

/// Resolves a page-relative link into an absolute URL
///
/// # Rules
///
/// | Page | Input | Output |
/// |------|-------|--------|
/// | 1 | `catalogue/x.html` | `{base}/catalogue/x.html` |
/// | N > 1, detail | `../../x.html` | `{base}/catalogue/x.html` |
/// | N > 1, thumbnail | `../media/y.jpg` | `{base}/media/y.jpg` |
///
/// On later pages every leading `../` segment is stripped before the
/// base for the link kind is applied. Links that are already absolute are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use catalog_sync::url::{resolve_link, LinkKind};
///
/// let url = resolve_link("https://books.toscrape.com", 2, "../../x.html", LinkKind::Detail).unwrap();
/// assert_eq!(url.as_str(), "https://books.toscrape.com/catalogue/x.html");
/// ```
pub fn resolve_link(
    base: &str,
    page: u32,
    relative: &str,
    kind: LinkKind,
) -> Result<Url, url::ParseError> {
    let relative = relative.trim();

    if let Ok(absolute) = Url::parse(relative) {
        return Ok(absolute);
    }

    let base = trim_base(base);
    let joined = if page <= 1 {
        format!("{}/{}", base, relative.trim_start_matches('/'))
    } else {
        let rest = strip_parent_segments(relative);
        match kind {
            LinkKind::Detail => format!("{}/{}/{}", base, CATALOGUE_DIR, rest),
            LinkKind::Thumbnail => format!("{}/{}", base, rest),
        }
    };

    Url::parse(&joined)
}

/// Removes every leading `../` (and stray `./`) segment
fn strip_parent_segments(mut path: &str) -> &str {
    loop {
        if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else {
            return path;
        }
    }
}
