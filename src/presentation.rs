//! Display shaping for listing cards and the detail overlay.
//!
//! Image URLs follow the storage convention
//! `{base}/storage/v1/object/public/properties/{path}`, where `path` is the
//! stored object path (itself prefixed with `properties/`).

use crate::models::{Property, PropertyStatus, PropertyType};
use serde::Serialize;

pub const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1600585154340-be6161a56a0c?ixlib=rb-4.0.3&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=1770&q=80";

const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public/properties/";

pub fn image_url(base_url: &str, path: &str) -> String {
    format!("{}{}{}", base_url, PUBLIC_OBJECT_PREFIX, path)
}

/// `R$ 2.500.000`
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if price < 0 {
        format!("R$ -{}", grouped)
    } else {
        format!("R$ {}", grouped)
    }
}

pub fn status_label(status: Option<PropertyStatus>) -> &'static str {
    match status {
        Some(PropertyStatus::Launch) => "Lançamento",
        Some(PropertyStatus::New) => "Novo",
        // anything else renders as used
        _ => "Usado",
    }
}

pub fn type_label(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::Apartment => "Apartamento",
        PropertyType::House => "Casa",
        PropertyType::Mansion => "Mansão",
        PropertyType::Townhouse => "Sobrado",
        PropertyType::Commercial => "Comercial",
        PropertyType::Land => "Terreno",
    }
}

/// Listing card on the homepage and in search results
#[derive(Debug, Clone, Serialize)]
pub struct PropertyCard {
    pub id: String,
    pub title: String,
    pub location: String,
    pub price: i64,
    pub price_label: String,
    pub status_label: &'static str,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spots: Option<i32>,
    pub area: Option<f64>,
    pub amenities: Vec<String>,
    pub cover_image: String,
}

impl PropertyCard {
    pub fn new(property: &Property, base_url: &str) -> Self {
        let cover_image = property
            .images
            .first()
            .map(|path| image_url(base_url, path))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        Self {
            id: property.id.clone(),
            title: property.title.clone(),
            location: property.location.clone(),
            price: property.price,
            price_label: format_price(property.price),
            status_label: status_label(property.status),
            bedrooms: property.bedrooms,
            suites: property.suites,
            bathrooms: property.bathrooms,
            parking_spots: property.parking_spots,
            area: property.area,
            amenities: property.amenities.clone(),
            cover_image,
        }
    }
}

/// Every attribute of one listing, for the detail overlay
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: Property,
    pub price_label: String,
    pub status_label: &'static str,
    pub type_label: Option<&'static str>,
    pub image_urls: Vec<String>,
}

impl PropertyDetails {
    pub fn new(property: Property, base_url: &str) -> Self {
        let image_urls = property
            .images
            .iter()
            .map(|path| image_url(base_url, path))
            .collect();

        Self {
            price_label: format_price(property.price),
            status_label: status_label(property.status),
            type_label: property.property_type.map(type_label),
            image_urls,
            property,
        }
    }
}
