pub mod memory;
pub mod query;
pub mod supabase;
pub mod traits;

pub use memory::MemoryBackend;
pub use query::{Column, PropertyQuery};
pub use supabase::SupabaseBackend;
pub use traits::ListingBackend;
