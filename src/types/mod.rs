pub mod auth;
pub mod geo;

pub use auth::{LoginRequest, LoginResponse, MeResponse, PingResponse};
pub use geo::GeoRecord;
