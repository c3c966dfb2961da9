//! Client tier: session gate, geolocation lookups, history and map view.

pub mod api;
pub mod geo;
pub mod history;
pub mod home;
pub mod map;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use geo::GeoClient;
pub use history::{History, HistoryEntry};
pub use home::Home;
pub use map::MapView;
pub use session::{Navigation, Route, Session, View, gate};
pub use storage::LocalStorage;
