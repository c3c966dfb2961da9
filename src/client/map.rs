//! Single-marker map view over OpenStreetMap tiles.

use crate::types::GeoRecord;
use std::f64::consts::PI;
use std::fmt;

pub const ZOOM: u8 = 10;
/// Deepest zoom the tile server publishes.
pub const MAX_ZOOM: u8 = 19;
pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Web-Mercator cannot represent the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Parse a provider `"lat,lon"` string.
    pub fn parse(loc: &str) -> Option<Self> {
        let (lat, lon) = loc.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    pub fn from_record(record: &GeoRecord) -> Option<Self> {
        record.loc.as_deref().and_then(Self::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    /// The slippy-map tile containing `c` at `zoom`, capped at [`MAX_ZOOM`].
    pub fn containing(c: Coordinates, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let n = f64::from(1u32 << zoom);
        let max = (1u32 << zoom) - 1;
        let lat = c.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = ((c.lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
        Self {
            z: zoom,
            x: (x.max(0.0) as u32).min(max),
            y: (y.max(0.0) as u32).min(max),
        }
    }

    pub fn url(&self) -> String {
        TILE_URL_TEMPLATE
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub center: Coordinates,
    pub zoom: u8,
    pub tile: Tile,
    /// `"<city>, <region>"`
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    Placeholder,
    Marker(Marker),
}

impl MapView {
    /// View for the active record; anything without usable coordinates is a placeholder.
    pub fn for_record(record: Option<&GeoRecord>) -> Self {
        let Some(record) = record else {
            return MapView::Placeholder;
        };
        let Some(center) = Coordinates::from_record(record) else {
            return MapView::Placeholder;
        };
        MapView::Marker(Marker {
            center,
            zoom: ZOOM,
            tile: Tile::containing(center, ZOOM),
            popup: format!(
                "{}, {}",
                record.city.as_deref().unwrap_or(""),
                record.region.as_deref().unwrap_or("")
            ),
        })
    }

    pub fn center(&self) -> Option<Coordinates> {
        match self {
            MapView::Placeholder => None,
            MapView::Marker(m) => Some(m.center),
        }
    }

    /// Replace the view for a new active record. Returns `true` when the centre moved.
    pub fn recenter(&mut self, record: Option<&GeoRecord>) -> bool {
        let next = MapView::for_record(record);
        let moved = next.center() != self.center();
        *self = next;
        moved
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapView::Placeholder => write!(f, "Map unavailable"),
            MapView::Marker(m) => {
                writeln!(f, "Map @ {:.4},{:.4} (zoom {})", m.center.lat, m.center.lon, m.zoom)?;
                writeln!(f, "  tile:   {}", m.tile.url())?;
                write!(f, "  marker: {}", m.popup)
            }
        }
    }
}
