//! Listing desk: public property listings, search and a small admin API for a
//! real-estate site, backed by a hosted database, storage bucket and auth service.

pub mod admin;
pub mod backend;
pub mod config;
pub mod error;
pub mod listings;
pub mod models;
pub mod presentation;
pub mod server;
