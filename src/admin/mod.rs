pub mod form;
pub mod upload;

pub use form::{submit, PropertyForm};
pub use upload::{upload_images, ImageFile, UploadOutcome};

use crate::backend::{Column, ListingBackend, PropertyQuery};
use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, Property};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// Resolve the signed-in user or refuse
pub async fn require_user(backend: &dyn ListingBackend, access_token: &str) -> AppResult<AuthUser> {
    backend
        .current_user(access_token)
        .await?
        .ok_or_else(|| AppError::Unauthorized(form::UNAUTHENTICATED_MESSAGE.to_string()))
}

/// Every property, newest first
pub async fn list_properties(
    backend: &dyn ListingBackend,
    access_token: &str,
) -> AppResult<Vec<Property>> {
    require_user(backend, access_token).await?;

    let query = PropertyQuery::new().order_by(Column::CreatedAt, false);
    Ok(backend.select_properties(&query).await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachResult {
    pub property: Property,
    pub failed: Vec<String>,
    pub error: Option<String>,
}

/// Per-property locks around the read, append, write cycle of `attach_images`.
/// Only serializes attaches made through the same process.
#[derive(Default)]
pub struct AttachLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AttachLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Upload images and append the stored paths to an existing record.
/// Paths of succeeded uploads are kept even when others fail.
pub async fn attach_images(
    backend: &dyn ListingBackend,
    locks: &AttachLocks,
    access_token: &str,
    id: &str,
    files: Vec<ImageFile>,
) -> AppResult<AttachResult> {
    let user = require_user(backend, access_token).await?;

    let _guard = locks.lock(id).await;
    debug!("Holding attach lock for property {}", id);

    let existing = backend
        .get_property(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("property {}", id)))?;

    let outcome = upload_images(backend, access_token, files).await;
    let error = outcome.error_message();

    let property = if outcome.paths.is_empty() {
        existing
    } else {
        let mut form = PropertyForm::from_property(&existing);
        form.append_images(outcome.paths);
        // edits keep the creator
        let creator = existing.created_by.clone().unwrap_or(user.id);
        backend
            .update_property(access_token, id, &form.to_record(&creator))
            .await?
    };

    info!("Property {} now has {} images", property.id, property.images.len());
    Ok(AttachResult {
        property,
        failed: outcome.failed,
        error,
    })
}
