use crate::error::GeolensError;
use crate::types::GeoRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

pub const INVALID_IPV4: &str = "Please enter a valid IPv4 address";
pub const SELF_LOOKUP_FAILED: &str = "Could not fetch own location";
pub const IP_LOOKUP_FAILED: &str = "Failed to fetch location for that address";

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4]\d|1?\d?\d)(\.(25[0-5]|2[0-4]\d|1?\d?\d)){3}$")
        .expect("valid regex")
});

/// Dotted-quad IPv4 with every octet in 0..=255.
pub fn is_ipv4(addr: &str) -> bool {
    IPV4_RE.is_match(addr)
}

/// Thin wrapper over the geolocation provider's `/geo` and `/{ip}/geo` endpoints.
#[derive(Clone)]
pub struct GeoClient {
    client: reqwest::Client,
    base: Url,
}

impl GeoClient {
    pub fn new(base: Url, proxy: Option<&Url>) -> Result<Self, GeolensError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn with_client(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Location of the caller's own public address.
    pub async fn fetch_self(&self) -> Result<GeoRecord, GeolensError> {
        let url = self.base.join("geo")?;
        self.get(url).await.map_err(|e| {
            warn!(error = %e, "own-location lookup failed");
            GeolensError::Lookup {
                message: SELF_LOOKUP_FAILED,
                source: Some(e),
            }
        })
    }

    /// Location of `ip`. Rejects anything that is not a dotted-quad IPv4 before touching the network.
    pub async fn fetch_for(&self, ip: &str) -> Result<GeoRecord, GeolensError> {
        if !is_ipv4(ip) {
            return Err(GeolensError::validation(INVALID_IPV4));
        }
        let url = self.base.join(&format!("{ip}/geo"))?;
        self.get(url).await.map_err(|e| {
            warn!(ip, error = %e, "address lookup failed");
            GeolensError::Lookup {
                message: IP_LOOKUP_FAILED,
                source: Some(e),
            }
        })
    }

    async fn get(&self, url: Url) -> Result<GeoRecord, reqwest::Error> {
        debug!(%url, "geolocation request");
        self.client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<GeoRecord>()
            .await
    }
}
