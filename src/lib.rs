pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

pub use error::GeolensError;
pub use router::{GeolensState, geolens_router};
pub use service::AuthService;
