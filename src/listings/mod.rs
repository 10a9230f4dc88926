pub mod fallback;
pub mod loader;
pub mod search;

pub use fallback::fallback_listings;
pub use loader::{load_homepage, HomepageListings, ListingSource};
pub use search::{build_query, search, PriceRange, SearchFilters};
