use crate::client::geo::GeoClient;
use crate::client::history::{History, HistoryEntry};
use crate::client::map::MapView;
use crate::client::storage::LocalStorage;
use crate::error::GeolensError;
use crate::types::GeoRecord;
use std::fmt;
use tracing::debug;

/// State behind the home screen: the active record, its map, the lookup history
/// and the inline error line. Operations never fail outright; problems end up
/// in [`Home::error`].
pub struct Home {
    geo: GeoClient,
    history: History,
    active: Option<GeoRecord>,
    map: MapView,
    query: String,
    error: Option<String>,
}

impl Home {
    /// Home state from storage, without any network traffic.
    pub fn new(geo: GeoClient, storage: LocalStorage) -> Self {
        Self {
            geo,
            history: History::load(storage),
            active: None,
            map: MapView::Placeholder,
            query: String::new(),
            error: None,
        }
    }

    /// Home state with the caller's own location loaded as the active record.
    pub async fn open(geo: GeoClient, storage: LocalStorage) -> Self {
        let mut home = Self::new(geo, storage);
        home.load_client_geo().await;
        home
    }

    pub fn active(&self) -> Option<&GeoRecord> {
        self.active.as_ref()
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load_client_geo(&mut self) {
        match self.geo.fetch_self().await {
            Ok(record) => self.set_active(record),
            Err(e) => self.fail(e),
        }
    }

    /// Look up `query`, make it active and record it in history.
    /// Returns whether the lookup succeeded.
    pub async fn search(&mut self, query: &str) -> bool {
        self.query = query.to_string();
        self.error = None;
        let record = match self.geo.fetch_for(query).await {
            Ok(r) => r,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };
        self.set_active(record.clone());
        if let Err(e) = self.history.append(HistoryEntry::new(query, record)) {
            self.fail(e);
        }
        true
    }

    /// Forget the query and go back to the caller's own location.
    pub async fn clear(&mut self) {
        self.query.clear();
        self.load_client_geo().await;
    }

    pub fn load_from_history(&mut self, index: usize) {
        match self.history.select(index).cloned() {
            Some(record) => self.set_active(record),
            None => self.fail(GeolensError::validation(format!("No history entry #{index}"))),
        }
    }

    pub fn toggle(&mut self, index: usize) {
        if let Err(e) = self.history.toggle(index) {
            self.fail(e);
        }
    }

    pub fn remove_selected(&mut self) {
        match self.history.remove_checked() {
            Ok(n) => debug!(removed = n, "removed selected history entries"),
            Err(e) => self.fail(e),
        }
    }

    fn set_active(&mut self, record: GeoRecord) {
        if self.map.recenter(Some(&record)) {
            debug!("map recentred");
        }
        self.active = Some(record);
    }

    fn fail(&mut self, e: GeolensError) {
        self.error = Some(e.user_message());
    }
}

impl fmt::Display for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.error {
            writeln!(f, "! {err}")?;
        }
        if let Some(record) = &self.active {
            writeln!(f, "IP & Geolocation Info")?;
            for (label, value) in record.info_rows() {
                writeln!(f, "  {label:<8} {value}")?;
            }
        }
        writeln!(f, "Search History")?;
        if self.history.is_empty() {
            writeln!(f, "  No history")?;
        }
        for (i, entry) in self.history.entries().iter().enumerate() {
            let mark = if entry.checked { "x" } else { " " };
            writeln!(f, "  {i:>2} [{mark}] {}", entry.ip)?;
        }
        if self.history.any_checked() {
            writeln!(f, "  (run `geolens history remove-selected` to delete selected)")?;
        }
        write!(f, "{}", self.map)
    }
}
