//! Builder methods for `TestMap`.

use std::sync::Arc;

use geodata::{Geocoder, MemoryWarningStore, NearbyFeatureSource, Preferences, UserId, UserProfile, WarningStore};

use super::TestMap;
use crate::config::InteractionConfig;
use crate::lookup::GeoServices;
use crate::map_view::MapView;
use crate::session::CurrentSession;

impl TestMap {
    /// Replace the configuration and reset the view to its default center.
    pub fn with_config(mut self, config: InteractionConfig) -> Self {
        let world = self.app.world_mut();
        world.insert_resource(MapView::from_config(&config.map));
        world.insert_resource(config);
        self.app.update();
        self
    }

    pub fn with_services(mut self, services: GeoServices) -> Self {
        self.app.world_mut().insert_resource(services);
        self
    }

    pub fn with_nearby(mut self, nearby: Arc<dyn NearbyFeatureSource>) -> Self {
        self.app.world_mut().resource_mut::<GeoServices>().nearby = nearby;
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.app.world_mut().resource_mut::<GeoServices>().geocoder = geocoder;
        self
    }

    pub fn with_warnings(mut self, warnings: Arc<dyn WarningStore>) -> Self {
        self.app.world_mut().resource_mut::<GeoServices>().warnings = warnings;
        self
    }

    pub fn with_warning_records(self, records: Vec<geodata::WarningRecord>) -> Self {
        self.with_warnings(Arc::new(MemoryWarningStore::new(records)))
    }

    /// Start with `uid` signed in.
    pub fn signed_in_as(mut self, uid: &str) -> Self {
        let profile = UserProfile {
            uid: UserId::new(uid),
            email: None,
            display_name: Some(uid.to_string()),
            is_anonymous: false,
            preferences: Preferences::default(),
        };
        self.app.world_mut().insert_resource(CurrentSession(Some(profile)));
        self
    }
}
