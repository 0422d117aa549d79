//! HTTP transport for the bookshelf service.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /books`, `POST /books`
//! - `GET /books/:id`, `PUT /books/:id`, `DELETE /books/:id`

pub mod api;
pub mod config;
pub mod response;
pub mod router;
pub mod server;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use response::{ApiError, FieldError, ResponseError, ResponseSuccess};
pub use router::build_router;
pub use server::HttpServer;
pub use state::{AppState, DispatchError};
