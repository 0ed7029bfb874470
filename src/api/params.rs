use crate::api::ApiError;
use crate::item::Rating;
use crate::storage::{ItemFilter, ItemQuery, SortField, SortOrder, MAX_LIMIT};
use serde::Deserialize;
use std::str::FromStr;

/// Raw query string of `GET /api/items`
///
/// Values arrive as text and are validated by [`ListParams::into_query`], so
/// a bad value yields a JSON 400 naming the parameter. Empty values count as
/// absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ItemQuery, ApiError> {
        let mut query = ItemQuery::default();

        if let Some(page) = parse_number::<u32>("page", &self.page)? {
            if page == 0 {
                return Err(ApiError::bad_request("page must be at least 1"));
            }
            query.page = page;
        }

        if let Some(limit) = parse_number::<u32>("limit", &self.limit)? {
            if limit == 0 || limit > MAX_LIMIT {
                return Err(ApiError::bad_request(format!(
                    "limit must be between 1 and {}",
                    MAX_LIMIT
                )));
            }
            query.limit = limit;
        }

        let min_rating = parse_rating("minRating", &self.min_rating)?;
        let max_rating = parse_rating("maxRating", &self.max_rating)?;
        let min_price = parse_price("minPrice", &self.min_price)?;
        let max_price = parse_price("maxPrice", &self.max_price)?;

        let in_stock = match present(&self.in_stock) {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(ApiError::bad_request(format!(
                    "inStock must be true or false, got {:?}",
                    other
                )))
            }
        };

        if let Some(sort_by) = present(&self.sort_by) {
            query.sort_by = SortField::parse(sort_by).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "sortBy must be one of title, price, rating, scrapedAt; got {:?}",
                    sort_by
                ))
            })?;
        }

        if let Some(sort_order) = present(&self.sort_order) {
            query.sort_order = SortOrder::parse(sort_order).ok_or_else(|| {
                ApiError::bad_request(format!("sortOrder must be asc or desc, got {:?}", sort_order))
            })?;
        }

        query.filter = ItemFilter {
            search: present(&self.search).map(str::to_string),
            min_rating,
            max_rating,
            min_price,
            max_price,
            in_stock,
        };

        Ok(query)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(name: &str, value: &Option<String>) -> Result<Option<T>, ApiError> {
    present(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ApiError::bad_request(format!("{} is not a valid number: {:?}", name, raw)))
        })
        .transpose()
}

fn parse_rating(name: &str, value: &Option<String>) -> Result<Option<u8>, ApiError> {
    let rating = parse_number::<u8>(name, value)?;
    match rating {
        Some(r) if r > Rating::MAX => Err(ApiError::bad_request(format!(
            "{} must be between 0 and {}",
            name,
            Rating::MAX
        ))),
        other => Ok(other),
    }
}

fn parse_price(name: &str, value: &Option<String>) -> Result<Option<f64>, ApiError> {
    let price = parse_number::<f64>(name, value)?;
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(ApiError::bad_request(format!(
            "{} must be a non-negative number",
            name
        ))),
        other => Ok(other),
    }
}
