pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod queries;
pub mod routes;
pub mod shopping_list;
pub mod validation;

pub use routes::{AppState, router};
