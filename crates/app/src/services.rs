//! Builds the external collaborators from configuration.

use std::sync::Arc;

use bevy::prelude::*;
use geodata::{
    Geocoder, JsonWarningStore, LocationIqGeocoder, MemoryWarningStore, NearbyFeatureSource, OsmMapSource,
    ReqwestClient, WarningStore,
};
use interaction::config::{ServicesConfig, API_KEY_ENV, SearchConfig};
use interaction::{GeoServices, InteractionConfig};

pub fn build_services(config: &InteractionConfig) -> GeoServices {
    let services = &config.services;
    let warnings = warning_store(services);
    match ReqwestClient::with_timeout(services.http_timeout()) {
        Ok(client) => {
            let geocoder = geocoder(client.clone(), services, &config.search);
            let nearby: Arc<dyn NearbyFeatureSource> = Arc::new(OsmMapSource::new(client, services.osm_base_url.clone()));
            info!(
                "Geocoder {} ({}), map data {}",
                services.geocoder_base_url,
                if services.geocoder_api_key.is_some() { "key set" } else { "no key" },
                services.osm_base_url
            );
            GeoServices::new(geocoder, nearby, warnings)
        }
        Err(e) => {
            error!("Could not build HTTP client, running offline: {}", e);
            let offline = GeoServices::offline();
            GeoServices::new(offline.geocoder, offline.nearby, warnings)
        }
    }
}

fn geocoder(client: ReqwestClient, services: &ServicesConfig, search: &SearchConfig) -> Arc<dyn Geocoder> {
    if services.geocoder_api_key.is_none() {
        warn!("{} is not set, place search will fail", API_KEY_ENV);
    }
    Arc::new(
        LocationIqGeocoder::new(client, services.geocoder_base_url.clone(), services.geocoder_api_key.clone())
            .with_limit(search.result_limit),
    )
}

fn warning_store(services: &ServicesConfig) -> Arc<dyn WarningStore> {
    match &services.warnings_file {
        Some(path) => {
            info!("Reading warnings from {}", path.display());
            Arc::new(JsonWarningStore::new(path.clone()))
        }
        None => Arc::new(MemoryWarningStore::default()),
    }
}
