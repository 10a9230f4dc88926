use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::admin::{self, ImageFile, PropertyForm, UploadOutcome};
use crate::error::{AppError, AppResult, BackendError};
use crate::listings::{self, fallback_listings, ListingSource, SearchFilters};
use crate::models::{Property, Session};
use crate::presentation::{PropertyCard, PropertyDetails};

use super::auth::BearerToken;
use super::state::AppState;

#[derive(Serialize)]
pub struct HomepageResponse {
    source: ListingSource,
    error: Option<String>,
    listings: Vec<PropertyCard>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    count: usize,
    results: Vec<PropertyCard>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    paths: Vec<String>,
    failed: Vec<String>,
    error: Option<String>,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            error: outcome.error_message(),
            paths: outcome.paths,
            failed: outcome.failed,
        }
    }
}

fn cards(properties: &[Property], base_url: &str) -> Vec<PropertyCard> {
    properties
        .iter()
        .map(|p| PropertyCard::new(p, base_url))
        .collect()
}

pub async fn health_handler() -> &'static str {
    "healthy"
}

pub async fn listings_handler(State(state): State<Arc<AppState>>) -> Json<HomepageResponse> {
    let homepage = listings::load_homepage(state.backend.as_ref()).await;

    Json(HomepageResponse {
        source: homepage.source,
        error: homepage.error,
        listings: cards(&homepage.listings, &state.public_url),
    })
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<SearchFilters>,
) -> AppResult<Json<SearchResponse>> {
    let results = listings::search(state.backend.as_ref(), &filters).await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results: cards(&results, &state.public_url),
    }))
}

/// Stored rows first; the built-in samples stay viewable while the homepage shows them
pub async fn property_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<PropertyDetails>> {
    let property = match state.backend.get_property(&id).await? {
        Some(property) => property,
        None => fallback_listings()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("property {}", id)))?,
    };

    Ok(Json(PropertyDetails::new(property, &state.public_url)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Session>> {
    match state.backend.sign_in(&request.email, &request.password).await {
        Ok(session) => {
            info!("Signed in {}", request.email);
            Ok(Json(session))
        }
        Err(BackendError::Status { status, .. }) if status == 400 || status == 401 => {
            warn!("Rejected sign-in for {}", request.email);
            Err(AppError::Unauthorized("Invalid login credentials".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn admin_list_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<Vec<Property>>> {
    let properties = admin::list_properties(state.backend.as_ref(), &token).await?;
    Ok(Json(properties))
}

pub async fn create_property_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Json(form): Json<PropertyForm>,
) -> AppResult<impl IntoResponse> {
    let property = admin::submit(state.backend.as_ref(), &token, None, &form).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn update_property_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    Json(form): Json<PropertyForm>,
) -> AppResult<Json<Property>> {
    let property = admin::submit(state.backend.as_ref(), &token, Some(&id), &form).await?;
    Ok(Json(property))
}

pub async fn upload_images_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    admin::require_user(state.backend.as_ref(), &token).await?;

    let files = read_files(multipart).await?;
    let outcome = admin::upload_images(state.backend.as_ref(), &token, files).await;
    Ok(Json(outcome.into()))
}

pub async fn attach_images_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<admin::AttachResult>> {
    let files = read_files(multipart).await?;
    let result = admin::attach_images(
        state.backend.as_ref(),
        &state.attach_locks,
        &token,
        &id,
        files,
    )
    .await?;
    Ok(Json(result))
}

/// Collect every file part of the request
async fn read_files(mut multipart: Multipart) -> AppResult<Vec<ImageFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed upload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("unable to read {}: {}", file_name, e)))?;

        files.push(ImageFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("no files selected".to_string()));
    }
    Ok(files)
}
