use crate::backend::ListingBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Property, PropertyRecord, PropertyStatus, PropertyType};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Error shown when a submit arrives without a signed-in user
pub const UNAUTHENTICATED_MESSAGE: &str = "Usuário não autenticado";

/// Editable state of the admin property form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub bedrooms: Option<i32>,
    pub suites: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spots: Option<i32>,
    pub area: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl PropertyForm {
    /// Prefill the form for editing an existing record
    pub fn from_property(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            description: property.description.clone(),
            price: property.price,
            location: property.location.clone(),
            property_type: property.property_type,
            status: property.status,
            bedrooms: property.bedrooms,
            suites: property.suites,
            bathrooms: property.bathrooms,
            parking_spots: property.parking_spots,
            area: property.area,
            amenities: property.amenities.clone(),
            images: property.images.clone(),
        }
    }

    pub fn amenities_text(&self) -> String {
        self.amenities.join(", ")
    }

    /// Replace amenities from a comma-separated field
    pub fn set_amenities_text(&mut self, text: &str) {
        self.amenities = text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn append_images(&mut self, paths: impl IntoIterator<Item = String>) {
        self.images.extend(paths);
    }

    /// Detach one image; out-of-range indexes are ignored
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("location is required".to_string());
        }
        if self.price < 0 {
            return Err("price must not be negative".to_string());
        }

        let counts = [
            ("bedrooms", self.bedrooms),
            ("suites", self.suites),
            ("bathrooms", self.bathrooms),
            ("parking_spots", self.parking_spots),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| v.is_some_and(|n| n < 0)) {
            return Err(format!("{} must not be negative", name));
        }

        if self.area.is_some_and(|a| !a.is_finite() || a < 0.0) {
            return Err("area must be a non-negative number".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self, created_by: &str) -> PropertyRecord {
        PropertyRecord {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            location: self.location.trim().to_string(),
            price: self.price,
            status: self.status,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            suites: self.suites,
            bathrooms: self.bathrooms,
            parking_spots: self.parking_spots,
            area: self.area,
            amenities: self.amenities.clone(),
            images: self.images.clone(),
            created_by: created_by.to_string(),
        }
    }
}

/// Create a property, or update `editing_id` when given.
/// The signed-in user is resolved before anything is written.
pub async fn submit(
    backend: &dyn ListingBackend,
    access_token: &str,
    editing_id: Option<&str>,
    form: &PropertyForm,
) -> AppResult<Property> {
    let user = backend
        .current_user(access_token)
        .await?
        .ok_or_else(|| {
            warn!("Rejected property submit without an authenticated user");
            AppError::Unauthorized(UNAUTHENTICATED_MESSAGE.to_string())
        })?;

    form.validate().map_err(AppError::Validation)?;
    let record = form.to_record(&user.id);

    let saved = match editing_id {
        Some(id) => backend.update_property(access_token, id, &record).await?,
        None => backend.insert_property(access_token, &record).await?,
    };

    info!("Saved property {} for user {}", saved.id, user.id);
    Ok(saved)
}
