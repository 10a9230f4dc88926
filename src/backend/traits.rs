use crate::backend::query::PropertyQuery;
use crate::error::BackendError;
use crate::models::{AuthUser, FeaturedProperty, Property, PropertyRecord, SearchHistory, Session};
use async_trait::async_trait;

/// Everything the site consumes from the hosted database, storage and auth service.
/// Write operations take the signed-in user's access token.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// Active `featured_properties` rows joined to their property, position ascending
    async fn featured_properties(&self) -> Result<Vec<FeaturedProperty>, BackendError>;

    async fn select_properties(&self, query: &PropertyQuery) -> Result<Vec<Property>, BackendError>;

    async fn get_property(&self, id: &str) -> Result<Option<Property>, BackendError>;

    async fn insert_property(
        &self,
        access_token: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError>;

    async fn update_property(
        &self,
        access_token: &str,
        id: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError>;

    /// Append one row to `property_search`
    async fn record_search(&self, entry: &SearchHistory) -> Result<(), BackendError>;

    /// Upload into the `properties` bucket, returning the stored path
    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;

    /// Resolve a token to its user; `None` when the token is not accepted
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    fn backend_name(&self) -> &'static str;
}
