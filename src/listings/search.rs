use crate::backend::{Column, ListingBackend, PropertyQuery};
use crate::error::BackendError;
use crate::models::{Property, PropertyStatus, PropertyType, SearchHistory};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Sparse search criteria as submitted by the search form.
/// Every field is optional and blank values count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub property_status: Option<PropertyStatus>,
    #[serde(default, deserialize_with = "leading_count")]
    pub bedrooms: Option<i32>,
    #[serde(default, deserialize_with = "leading_count")]
    pub suites: Option<i32>,
    #[serde(default, deserialize_with = "leading_count")]
    pub parking_spots: Option<i32>,
    /// `"min-max"`, either side may be empty
    #[serde(default, deserialize_with = "blank_as_none")]
    pub price_range: Option<String>,
}

/// Accepts strings (query strings, form posts) and bare JSON numbers
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "unexpected filter value: {}",
                other
            )))
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(serde::de::Error::custom)
}

/// Minimum counts take the leading integer of the value, so `"2.5"` and
/// `"3+"` filter on 2 and 3. Values without leading digits are rejected.
fn leading_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = blank_as_none::<D, String>(deserializer)? else {
        return Ok(None);
    };

    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits = raw[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |end| end + sign_len);
    raw[..digits]
        .parse()
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid count: {}", raw)))
}

/// Open-ended price interval parsed from `"min-max"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceRange {
    pub fn parse(raw: &str) -> Self {
        let mut bounds = raw.splitn(2, '-');
        let min = bounds.next().and_then(parse_bound);
        let max = bounds.next().and_then(parse_bound);
        Self { min, max }
    }
}

fn parse_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring unparseable price bound '{}'", raw);
            None
        }
    }
}

impl SearchFilters {
    pub fn price_range(&self) -> Option<PriceRange> {
        self.price_range.as_deref().map(PriceRange::parse)
    }
}

impl SearchHistory {
    /// Raw criteria of a submitted search
    pub fn from_filters(filters: &SearchFilters) -> Self {
        let range = filters.price_range().unwrap_or_default();
        Self {
            location: filters.location.clone(),
            property_type: filters.property_type,
            status: filters.property_status,
            price_range_min: range.min,
            price_range_max: range.max,
            bedrooms: filters.bedrooms,
            suites: filters.suites,
            parking_spots: filters.parking_spots,
        }
    }
}

/// Translate present filters into one AND-combined query
pub fn build_query(filters: &SearchFilters) -> PropertyQuery {
    let mut query = PropertyQuery::new();

    if let Some(location) = &filters.location {
        query = query.ilike(Column::Location, location.as_str());
    }
    if let Some(property_type) = filters.property_type {
        query = query.eq(Column::Type, property_type.as_str());
    }
    if let Some(status) = filters.property_status {
        query = query.eq(Column::Status, status.as_str());
    }
    if let Some(bedrooms) = filters.bedrooms {
        query = query.gte(Column::Bedrooms, i64::from(bedrooms));
    }
    if let Some(suites) = filters.suites {
        query = query.gte(Column::Suites, i64::from(suites));
    }
    if let Some(parking_spots) = filters.parking_spots {
        query = query.gte(Column::ParkingSpots, i64::from(parking_spots));
    }
    if let Some(range) = filters.price_range() {
        if let Some(min) = range.min {
            query = query.gte(Column::Price, min);
        }
        if let Some(max) = range.max {
            query = query.lte(Column::Price, max);
        }
    }

    query
}

/// Run the search, then append the criteria to the search history.
/// History persistence is best-effort and never fails the search.
pub async fn search(
    backend: &dyn ListingBackend,
    filters: &SearchFilters,
) -> Result<Vec<Property>, BackendError> {
    let query = build_query(filters);
    debug!("Search filters {:?} -> {} conditions", filters, query.filters.len());

    let results = backend.select_properties(&query).await.map_err(|e| {
        error!("Error searching properties: {}", e);
        e
    })?;

    if let Err(e) = backend
        .record_search(&SearchHistory::from_filters(filters))
        .await
    {
        warn!("Failed to record search history: {}", e);
    }

    info!("Search matched {} properties", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::listings::fallback_listings;

    async fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        for property in fallback_listings() {
            backend.seed(property).await;
        }
        backend
    }

    #[test]
    fn price_range_bounds() {
        assert_eq!(
            PriceRange::parse("500000-1000000"),
            PriceRange {
                min: Some(500_000),
                max: Some(1_000_000)
            }
        );
        assert_eq!(
            PriceRange::parse("5000000-"),
            PriceRange {
                min: Some(5_000_000),
                max: None
            }
        );
        assert_eq!(
            PriceRange::parse("-800000"),
            PriceRange {
                min: None,
                max: Some(800_000)
            }
        );
        assert_eq!(PriceRange::parse("abc-"), PriceRange::default());
    }

    #[test]
    fn blank_query_fields_are_absent() {
        let filters: SearchFilters = serde_json::from_value(serde_json::json!({
            "location": "  ",
            "propertyType": "",
            "bedrooms": "3",
            "parkingSpots": 2,
            "priceRange": ""
        }))
        .unwrap();

        assert_eq!(filters.location, None);
        assert_eq!(filters.property_type, None);
        assert_eq!(filters.bedrooms, Some(3));
        assert_eq!(filters.parking_spots, Some(2));
        assert_eq!(filters.price_range, None);
    }

    #[test]
    fn counts_use_the_leading_integer() {
        let filters: SearchFilters = serde_json::from_value(serde_json::json!({
            "bedrooms": "2.5",
            "suites": "3+",
            "parkingSpots": 1.9
        }))
        .unwrap();

        assert_eq!(filters.bedrooms, Some(2));
        assert_eq!(filters.suites, Some(3));
        assert_eq!(filters.parking_spots, Some(1));

        let parsed: Result<SearchFilters, _> =
            serde_json::from_value(serde_json::json!({ "bedrooms": "muitos" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let parsed: Result<SearchFilters, _> =
            serde_json::from_value(serde_json::json!({ "propertyType": "castle" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_filters_build_an_unfiltered_query() {
        let query = build_query(&SearchFilters::default());
        assert!(query.filters.is_empty());
        assert_eq!(query.limit, None);
    }

    #[tokio::test]
    async fn empty_filters_return_everything() {
        let backend = seeded().await;
        let results = search(&backend, &SearchFilters::default()).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let backend = seeded().await;
        let filters = SearchFilters {
            location: Some("são paulo".to_string()),
            property_type: Some(PropertyType::Apartment),
            suites: Some(3),
            ..Default::default()
        };

        let results = search(&backend, &filters).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[tokio::test]
    async fn status_and_price_range() {
        let backend = seeded().await;
        let filters = SearchFilters {
            property_status: Some(PropertyStatus::New),
            price_range: Some("3000000-4000000".to_string()),
            ..Default::default()
        };

        let results = search(&backend, &filters).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }

    #[tokio::test]
    async fn history_records_raw_criteria() {
        let backend = seeded().await;
        let filters = SearchFilters {
            location: Some("Jardins".to_string()),
            bedrooms: Some(2),
            price_range: Some("1000000-".to_string()),
            ..Default::default()
        };

        search(&backend, &filters).await.unwrap();

        let history = backend.search_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].location.as_deref(), Some("Jardins"));
        assert_eq!(history[0].bedrooms, Some(2));
        assert_eq!(history[0].price_range_min, Some(1_000_000));
        assert_eq!(history[0].price_range_max, None);
    }

    #[tokio::test]
    async fn history_failure_does_not_block_results() {
        let backend = seeded().await;
        backend.fail_search_history(true);

        let results = search(&backend, &SearchFilters::default()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(backend.search_history().await.is_empty());
    }

    #[tokio::test]
    async fn query_failure_skips_history() {
        let backend = seeded().await;
        backend.fail_reads(true);

        assert!(search(&backend, &SearchFilters::default()).await.is_err());
        assert!(backend.search_history().await.is_empty());
    }
}
