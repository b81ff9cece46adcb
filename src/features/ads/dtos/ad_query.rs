use crate::core::error::{AppError, Result};
use crate::features::ads::services::AdFilter;
use crate::shared::types::PaginationQuery;

/// Parsed query string of the ad listing.
///
/// Parsed by hand because `cat` may repeat (`?cat=1&cat=2`). Empty values
/// count as absent; non-numeric values for numeric parameters are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdListQuery {
    pub filter: AdFilter,
    pub page: i64,
    pub page_size: i64,
}

impl AdListQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let defaults = PaginationQuery::default();
        let mut query = AdListQuery {
            filter: AdFilter::default(),
            page: defaults.page,
            page_size: defaults.page_size,
        };

        for pair in raw.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key)?;
            let value = decode(value)?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                "cat" => query.filter.categories.push(parse_int("cat", value)?),
                "text" => query.filter.text = Some(value.to_string()),
                "location" => query.filter.location = Some(value.to_string()),
                "price_from" => query.filter.price_from = Some(parse_int("price_from", value)?),
                "price_to" => query.filter.price_to = Some(parse_int("price_to", value)?),
                "page" => query.page = parse_int("page", value)?,
                "page_size" => query.page_size = parse_int("page_size", value)?,
                _ => {}
            }
        }

        Ok(query)
    }

    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Decode one form-urlencoded component (`+` is a space)
fn decode(component: &str) -> Result<String> {
    urlencoding::decode(&component.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AppError::BadRequest("Query string is not valid UTF-8".to_string()))
}

fn parse_int(field: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| AppError::field(field, "must be an integer"))
}
