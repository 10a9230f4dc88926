use crate::backend::query::PropertyQuery;
use crate::backend::traits::ListingBackend;
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::models::{AuthUser, FeaturedProperty, Property, PropertyRecord, SearchHistory, Session};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Storage bucket holding listing images
pub const BUCKET: &str = "properties";

const FEATURED_SELECT: &str = "position,active,property:properties(*)";

/// Client for the hosted REST/storage/auth service
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("listing-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach `apikey` and a bearer token, the anon key when no user token is given
    fn authorize(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!("Backend returned status {}: {}", status, message);
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let body = Self::check(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn first_row(response: Response, what: &str) -> Result<Property, BackendError> {
        let rows: Vec<Property> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(what.to_string()))
    }
}

#[async_trait]
impl ListingBackend for SupabaseBackend {
    async fn featured_properties(&self) -> Result<Vec<FeaturedProperty>, BackendError> {
        debug!("Fetching active featured properties");

        let request = self.client.get(self.rest_url("featured_properties")).query(&[
            ("select", FEATURED_SELECT),
            ("active", "eq.true"),
            ("order", "position.asc"),
        ]);

        let response = self.authorize(request, None).send().await?;
        Self::decode(response).await
    }

    async fn select_properties(&self, query: &PropertyQuery) -> Result<Vec<Property>, BackendError> {
        let params = query.to_params();
        debug!("Selecting properties with {:?}", params);

        let request = self.client.get(self.rest_url("properties")).query(&params);
        let response = self.authorize(request, None).send().await?;
        Self::decode(response).await
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>, BackendError> {
        debug!("Fetching property {}", id);

        let id_filter = format!("eq.{}", id);
        let request = self.client.get(self.rest_url("properties")).query(&[
            ("select", "*"),
            ("id", id_filter.as_str()),
            ("limit", "1"),
        ]);

        let response = self.authorize(request, None).send().await?;
        let rows: Vec<Property> = Self::decode(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_property(
        &self,
        access_token: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError> {
        debug!("Inserting property '{}'", record.title);

        let request = self
            .client
            .post(self.rest_url("properties"))
            .header("Prefer", "return=representation")
            .json(&[record]);

        let response = self.authorize(request, Some(access_token)).send().await?;
        Self::first_row(response, "inserted property").await
    }

    async fn update_property(
        &self,
        access_token: &str,
        id: &str,
        record: &PropertyRecord,
    ) -> Result<Property, BackendError> {
        debug!("Updating property {}", id);

        let id_filter = format!("eq.{}", id);
        let request = self
            .client
            .patch(self.rest_url("properties"))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(record);

        let response = self.authorize(request, Some(access_token)).send().await?;
        Self::first_row(response, &format!("property {}", id)).await
    }

    async fn record_search(&self, entry: &SearchHistory) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.rest_url("property_search"))
            .header("Prefer", "return=minimal")
            .json(entry);

        let response = self.authorize(request, None).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        debug!("Uploading {} ({} bytes)", path, bytes.len());

        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, BUCKET, path);
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self.authorize(request, Some(access_token)).send().await?;
        Self::check(response).await?;
        Ok(path.to_string())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        let request = self.client.get(format!("{}/auth/v1/user", self.base_url));
        let response = self.authorize(request, Some(access_token)).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Access token rejected by auth service");
                Ok(None)
            }
            _ => Ok(Some(Self::decode(response).await?)),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        debug!("Password sign-in for {}", email);

        let request = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let response = self.authorize(request, None).send().await?;
        Self::decode(response).await
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}
