//! Web API module.
//!
//! This module provides the REST API over folders, assets, their files and
//! the catalog metadata, plus OpenAPI documentation served by Swagger UI.

pub mod api_doc;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
