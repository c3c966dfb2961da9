pub mod auth_service;
pub mod seed;

pub use auth_service::AuthService;
pub use seed::seed_user;
