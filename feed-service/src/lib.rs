//! Feedline - an authenticated content-feed service.
//!
//! Two parallel API surfaces (REST under `/feed` + `/auth`, GraphQL under
//! `/graphql`) share one domain layer, one document store, one asset store
//! and one mutation-event channel.

pub mod assets;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod schema;
pub mod services;
pub mod store;
pub mod validators;

pub use config::Config;
