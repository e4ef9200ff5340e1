/// Posts Service Library
///
/// Short text posts that other users can like and comment on, served over
/// HTTP behind bearer-token authentication.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers for posts and health checks
/// - `routes`: Route table and per-scope middleware
/// - `models`: Post, like and comment documents
/// - `services`: Ownership checks and the like/comment protocol
/// - `db`: `PostStore` trait with PostgreSQL and in-memory backends
/// - `validators`: Request body validation
/// - `error`: Error types and their HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
