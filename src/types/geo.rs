use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of an IP-to-location lookup as returned by the provider.
///
/// Every field is optional; fields the provider adds beyond these are kept in
/// `extra` so the record serializes back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// `"lat,lon"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeoRecord {
    /// Rows of the info table, with `-` for missing values.
    pub fn info_rows(&self) -> [(&'static str, &str); 6] {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }
        [
            (
                "IP",
                non_empty(&self.ip).or(non_empty(&self.hostname)).unwrap_or("-"),
            ),
            ("City", non_empty(&self.city).unwrap_or("-")),
            ("Region", non_empty(&self.region).unwrap_or("-")),
            ("Country", non_empty(&self.country).unwrap_or("-")),
            ("Loc", non_empty(&self.loc).unwrap_or("-")),
            ("Org", non_empty(&self.org).unwrap_or("-")),
        ]
    }
}
