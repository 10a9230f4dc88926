use crate::backend::query::PropertyQuery;
use crate::backend::traits::ListingBackend;
use crate::error::BackendError;
use crate::models::{AuthUser, FeaturedProperty, Property, PropertyRecord, SearchHistory, Session};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

struct FeaturedRow {
    position: i32,
    active: bool,
    property_id: String,
}

struct Account {
    password: String,
    access_token: String,
    user: AuthUser,
}

/// In-process backend with the same query semantics as the hosted service.
/// Used for local runs and as the test double throughout the crate.
#[derive(Default)]
pub struct MemoryBackend {
    properties: RwLock<Vec<Property>>,
    featured: RwLock<Vec<FeaturedRow>>,
    searches: RwLock<Vec<SearchHistory>>,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    accounts: RwLock<HashMap<String, Account>>,
    rejected_extensions: RwLock<HashSet<String>>,
    fail_reads: AtomicBool,
    fail_history: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row as-is, keeping its id and creation time
    pub async fn seed(&self, property: Property) {
        self.properties.write().await.push(property);
    }

    pub async fn feature(&self, property_id: &str, position: i32, active: bool) {
        self.featured.write().await.push(FeaturedRow {
            position,
            active,
            property_id: property_id.to_string(),
        });
    }

    /// Register an account able to sign in and write
    pub async fn add_user(&self, email: &str, password: &str, access_token: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        self.accounts.write().await.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                access_token: access_token.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Make every read of `properties` and `featured_properties` fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_search_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    /// Reject uploads whose object name ends with `.{extension}`
    pub async fn reject_uploads_with_extension(&self, extension: &str) {
        self.rejected_extensions
            .write()
            .await
            .insert(extension.to_string());
    }

    pub async fn search_history(&self) -> Vec<SearchHistory> {
        self.searches.read().await.clone()
    }

    pub async fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of inserts and updates applied to `properties`
    pub fn property_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                message: "reads disabled".to_string(),
            });
        }
        Ok(())
    }

    async fn authorize(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        self.current_user(access_token)
            .await?
            .ok_or_else(|| BackendError::Status {
                status: 401,
                message: "invalid access token".to_string(),
            })
    }
}

#[async_trait]
impl ListingBackend for MemoryBackend {
    async fn featured_properties(&self) -> Result<Vec<FeaturedProperty>, BackendError> {
        self.check_reads()?;

        let properties = self.properties.read().await;
        let mut rows: Vec<FeaturedProperty> = self
            .featured
            .read()
            .await
            .iter()
            .filter(|row| row.active)
            .map(|row| FeaturedProperty {
                position: row.position,
                active: row.active,
                property: properties.iter().find(|p| p.id == row.property_id).cloned(),
            })
            .collect();

        // stable sort keeps insertion order for equal positions
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    async fn select_properties(&self, query: &PropertyQuery) -> Result<Vec<Property>, BackendError> {
        self.check_reads()?;
        Ok(query.apply(&self.properties.read().await))
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>, BackendError> {
        self.check_reads()?;
        Ok(self
            .properties
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn insert_property(
        &self,
        access_token: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError> {
        self.authorize(access_token).await?;

        let property = record
            .clone()
            .into_property(Uuid::new_v4().to_string(), Utc::now());
        debug!("Inserted property {}", property.id);

        self.properties.write().await.push(property.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(property)
    }

    async fn update_property(
        &self,
        access_token: &str,
        id: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError> {
        self.authorize(access_token).await?;

        let mut properties = self.properties.write().await;
        let existing = properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("property {}", id)))?;

        let created_at = existing.created_at.unwrap_or_else(Utc::now);
        *existing = record.clone().into_property(id.to_string(), created_at);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(existing.clone())
    }

    async fn record_search(&self, entry: &SearchHistory) -> Result<(), BackendError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 500,
                message: "property_search unavailable".to_string(),
            });
        }
        self.searches.write().await.push(entry.clone());
        Ok(())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        self.authorize(access_token).await?;

        let rejected = self
            .rejected_extensions
            .read()
            .await
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext)));
        if rejected {
            return Err(BackendError::Status {
                status: 415,
                message: format!("upload of {} rejected", path),
            });
        }

        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.access_token == access_token)
            .map(|account| account.user.clone()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let accounts = self.accounts.read().await;
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(Session {
                access_token: account.access_token.clone(),
                user: account.user.clone(),
            }),
            _ => Err(BackendError::Status {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
