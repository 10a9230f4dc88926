use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commercial status of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Launch,
    New,
    Used,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Launch => "launch",
            PropertyStatus::New => "new",
            PropertyStatus::Used => "used",
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launch" => Ok(PropertyStatus::Launch),
            "new" => Ok(PropertyStatus::New),
            "used" => Ok(PropertyStatus::Used),
            other => Err(format!("unknown property status '{}'", other)),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of building or lot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Mansion,
    Townhouse,
    Commercial,
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Mansion => "mansion",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Commercial => "commercial",
            PropertyType::Land => "land",
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" => Ok(PropertyType::Apartment),
            "house" => Ok(PropertyType::House),
            "mansion" => Ok(PropertyType::Mansion),
            "townhouse" => Ok(PropertyType::Townhouse),
            "commercial" => Ok(PropertyType::Commercial),
            "land" => Ok(PropertyType::Land),
            other => Err(format!("unknown property type '{}'", other)),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core property data model, one row of `properties`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub location: String,
    pub price: i64,
    pub status: Option<PropertyStatus>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spots: Option<i32>,
    pub area: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: Vec<String>,
    /// Storage object paths inside the `properties` bucket
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Writable columns of this row, stamped with `created_by`
    pub fn into_record(self, created_by: String) -> PropertyRecord {
        PropertyRecord {
            title: self.title,
            description: self.description,
            location: self.location,
            price: self.price,
            status: self.status,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            suites: self.suites,
            bathrooms: self.bathrooms,
            parking_spots: self.parking_spots,
            area: self.area,
            amenities: self.amenities,
            images: self.images,
            created_by,
        }
    }
}

/// Writable columns of a property, as sent on insert and update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub status: Option<PropertyStatus>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spots: Option<i32>,
    pub area: Option<f64>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub created_by: String,
}

impl PropertyRecord {
    /// Materialise the record as a stored row
    pub fn into_property(self, id: String, created_at: DateTime<Utc>) -> Property {
        Property {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            price: self.price,
            status: self.status,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            suites: self.suites,
            bathrooms: self.bathrooms,
            parking_spots: self.parking_spots,
            area: self.area,
            amenities: self.amenities,
            images: self.images,
            created_by: Some(self.created_by),
            created_at: Some(created_at),
        }
    }
}

/// A `featured_properties` row joined to its property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedProperty {
    pub position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    /// `None` when the referenced property no longer exists
    pub property: Option<Property>,
}

/// Row ids may come back as uuid strings or bigint numbers
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected property id: {}",
            other
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_active() -> bool {
    true
}

/// Raw criteria of one submitted search, appended to `property_search`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchHistory {
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub price_range_min: Option<i64>,
    pub price_range_max: Option<i64>,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub parking_spots: Option<i32>,
}

/// Identity returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Password sign-in result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}
