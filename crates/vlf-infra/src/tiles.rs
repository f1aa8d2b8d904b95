//! HTTP tile source for XYZ slippy-map servers

use std::time::Duration;

use vlf_domain::repository::TileSource;
use vlf_types::MapError;

/// OpenStreetMap standard street tiles
pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Esri World Imagery satellite tiles (note the y/x order)
pub const ESRI_WORLD_IMAGERY_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";

pub const DEFAULT_USER_AGENT: &str = concat!("vlf-report/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP tile fetcher. One request per tile, no retries.
pub struct HttpTileSource {
    name: String,
    url_template: String,
    client: reqwest::blocking::Client,
}

impl HttpTileSource {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, MapError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| MapError::Settings(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            url_template: url_template.into(),
            client,
        })
    }

    /// Street tiles for the urban map
    pub fn street(url_template: &str, user_agent: &str, timeout: Duration) -> Result<Self, MapError> {
        Self::new("street", url_template, user_agent, timeout)
    }

    /// Aerial imagery for the rural map
    pub fn satellite(url_template: &str, user_agent: &str, timeout: Duration) -> Result<Self, MapError> {
        Self::new("satellite", url_template, user_agent, timeout)
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        expand_url(&self.url_template, z, x, y)
    }
}

/// Substitute `{z}`, `{x}` and `{y}` in a tile URL template
pub fn expand_url(template: &str, z: u8, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

impl TileSource for HttpTileSource {
    fn fetch_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<u8>, MapError> {
        let url = self.tile_url(z, x, y);
        tracing::debug!("Fetching {} tile: {}", self.name, url);

        let fetch_err = |reason: String| MapError::TileFetch { z, x, y, reason };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;

        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_osm_url() {
        assert_eq!(
            expand_url(OSM_TILE_URL, 17, 37050, 68610),
            "https://tile.openstreetmap.org/17/37050/68610.png"
        );
    }

    #[test]
    fn test_expand_esri_url_uses_row_before_column() {
        let url = expand_url(ESRI_WORLD_IMAGERY_URL, 17, 10, 20);
        assert!(url.ends_with("/tile/17/20/10"));
    }
}
