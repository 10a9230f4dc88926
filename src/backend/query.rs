use crate::models::Property;
use serde::{Deserialize, Serialize};

/// Filterable and sortable columns of `properties`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Column {
    Location,
    Type,
    Status,
    Price,
    Bedrooms,
    Suites,
    ParkingSpots,
    CreatedAt,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Location => "location",
            Column::Type => "type",
            Column::Status => "status",
            Column::Price => "price",
            Column::Bedrooms => "bedrooms",
            Column::Suites => "suites",
            Column::ParkingSpots => "parking_spots",
            Column::CreatedAt => "created_at",
        }
    }

    fn number(&self, property: &Property) -> Option<i64> {
        match self {
            Column::Price => Some(property.price),
            Column::Bedrooms => property.bedrooms.map(i64::from),
            Column::Suites => property.suites.map(i64::from),
            Column::ParkingSpots => property.parking_spots.map(i64::from),
            _ => None,
        }
    }

    fn text(&self, property: &Property) -> Option<String> {
        match self {
            Column::Location => Some(property.location.clone()),
            Column::Type => property.property_type.map(|t| t.as_str().to_string()),
            Column::Status => property.status.map(|s| s.as_str().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(Column, String),
    /// Case-insensitive substring match
    ILike(Column, String),
    Gte(Column, i64),
    Lte(Column, i64),
}

impl Filter {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            Filter::Eq(column, value) => column.text(property).as_deref() == Some(value.as_str()),
            Filter::ILike(column, needle) => column
                .text(property)
                .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            // NULL never satisfies a comparison
            Filter::Gte(column, bound) => column.number(property).is_some_and(|n| n >= *bound),
            Filter::Lte(column, bound) => column.number(property).is_some_and(|n| n <= *bound),
        }
    }

    fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.as_str().to_string(), format!("eq.{}", value)),
            Filter::ILike(column, needle) => {
                (column.as_str().to_string(), format!("ilike.*{}*", needle))
            }
            Filter::Gte(column, bound) => (column.as_str().to_string(), format!("gte.{}", bound)),
            Filter::Lte(column, bound) => (column.as_str().to_string(), format!("lte.{}", bound)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub ascending: bool,
}

/// A composable `properties` query, all filters combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl PropertyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `limit` most recently created properties
    pub fn most_recent(limit: usize) -> Self {
        Self::new()
            .order_by(Column::CreatedAt, false)
            .limit(limit)
    }

    pub fn eq(mut self, column: Column, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn ilike(mut self, column: Column, needle: impl Into<String>) -> Self {
        self.filters.push(Filter::ILike(column, needle.into()));
        self
    }

    pub fn gte(mut self, column: Column, bound: i64) -> Self {
        self.filters.push(Filter::Gte(column, bound));
        self
    }

    pub fn lte(mut self, column: Column, bound: i64) -> Self {
        self.filters.push(Filter::Lte(column, bound));
        self
    }

    pub fn order_by(mut self, column: Column, ascending: bool) -> Self {
        self.order = Some(Order { column, ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.filters.iter().all(|f| f.matches(property))
    }

    /// Filter, sort and truncate rows in process
    pub fn apply(&self, rows: &[Property]) -> Vec<Property> {
        let mut out: Vec<Property> = rows.iter().filter(|p| self.matches(p)).cloned().collect();

        if let Some(order) = self.order {
            out.sort_by(|a, b| {
                let ord = match order.column {
                    Column::CreatedAt => a.created_at.cmp(&b.created_at),
                    column => column.number(a).cmp(&column.number(b)),
                };
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    /// REST query parameters, `select=*` first
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filters.iter().map(Filter::to_param));

        if let Some(order) = self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push((
                "order".to_string(),
                format!("{}.{}", order.column.as_str(), direction),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
