//! Openers for the file stores and tile sources named in the config

use vlf_infra::map::MapRenderer;
use vlf_infra::persistence::{FileReferenceImageRepository, FileTemplateRepository};
use vlf_infra::tiles::HttpTileSource;
use vlf_types::Result;

use crate::config::Config;

/// Scan the templates directory
pub fn open_template_repo(config: &Config) -> Result<FileTemplateRepository> {
    FileTemplateRepository::open(config.templates_dir.clone())
}

/// Reference (voltage table) images
pub fn open_reference_images(config: &Config) -> FileReferenceImageRepository {
    FileReferenceImageRepository::new(config.images_dir.clone())
}

/// Map renderer backed by the configured HTTP tile servers
pub fn open_map_renderer(config: &Config) -> Result<MapRenderer> {
    let map = &config.map;
    let street = HttpTileSource::street(&map.street_tile_url, &map.user_agent, map.timeout())?;
    let satellite =
        HttpTileSource::satellite(&map.satellite_tile_url, &map.user_agent, map.timeout())?;
    let renderer = MapRenderer::new(Box::new(street), Box::new(satellite), map.settings())?;
    Ok(renderer)
}
