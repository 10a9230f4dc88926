use crate::backend::{ListingBackend, PropertyQuery};
use crate::error::BackendError;
use crate::listings::fallback::fallback_listings;
use crate::models::Property;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Banner shown when the listing queries fail
pub const LOAD_ERROR_MESSAGE: &str =
    "Não foi possível carregar os imóveis. Por favor, tente novamente mais tarde.";

/// Number of recent properties used when nothing is featured
pub const RECENT_LIMIT: usize = 3;

/// Where the homepage listings came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Featured,
    Recent,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomepageListings {
    pub source: ListingSource,
    pub listings: Vec<Property>,
    /// User-visible error banner, set when a query failed
    pub error: Option<String>,
}

/// Featured first, then most recent, then the built-in samples.
/// Never fails: a query error is logged and treated as an empty result.
pub async fn load_homepage(backend: &dyn ListingBackend) -> HomepageListings {
    match acquire(backend).await {
        Ok(Some((source, listings))) => {
            info!("Loaded {} {:?} listings", listings.len(), source);
            HomepageListings {
                source,
                listings,
                error: None,
            }
        }
        Ok(None) => {
            warn!("No featured or recent properties, using fallback listings");
            HomepageListings {
                source: ListingSource::Fallback,
                listings: fallback_listings(),
                error: None,
            }
        }
        Err(e) => {
            error!("Error loading featured listings: {}", e);
            HomepageListings {
                source: ListingSource::Fallback,
                listings: fallback_listings(),
                error: Some(LOAD_ERROR_MESSAGE.to_string()),
            }
        }
    }
}

async fn acquire(
    backend: &dyn ListingBackend,
) -> Result<Option<(ListingSource, Vec<Property>)>, BackendError> {
    // dangling featured rows carry no property and are dropped
    let featured: Vec<Property> = backend
        .featured_properties()
        .await?
        .into_iter()
        .filter_map(|row| row.property)
        .collect();

    if !featured.is_empty() {
        return Ok(Some((ListingSource::Featured, featured)));
    }

    let recent = backend
        .select_properties(&PropertyQuery::most_recent(RECENT_LIMIT))
        .await?;

    if recent.is_empty() {
        Ok(None)
    } else {
        Ok(Some((ListingSource::Recent, recent)))
    }
}
