//! # TestMap - headless harness for interaction tests
//!
//! Wraps a `bevy::app::App` running `InteractionPlugin` with a manually
//! advanced clock and canned collaborators, so gestures, lookups and
//! searches can be driven end to end without a window.

mod assertions;
mod canned;
mod input;
mod setup;

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::core::TaskPoolPlugin;

pub use canned::{poi, warning, BrokenStore, CannedGeocoder, CannedNearby};

use crate::arbiter::PointSelected;
use crate::lookup::PendingLookups;
use crate::map_view::MapView;
use crate::overlay::{OverlayController, OverlayView};
use crate::search::{PendingSearches, SearchController};
use crate::{InteractionPlugin, InteractionSet};

/// Clock step used while waiting.
pub const FRAME: Duration = Duration::from_millis(10);

/// Every `PointSelected` seen since the harness started.
#[derive(Resource, Default)]
struct SelectionLog(Vec<PointSelected>);

fn record_selections(mut events: EventReader<PointSelected>, mut log: ResMut<SelectionLog>) {
    log.0.extend(events.read().copied());
}

pub struct TestMap {
    app: App,
}

impl TestMap {
    /// A map at the default London view with offline collaborators.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(TaskPoolPlugin::default());
        app.insert_resource(Time::<()>::default());
        app.add_plugins(InteractionPlugin);
        app.init_resource::<SelectionLog>();
        app.add_systems(Update, record_selections.in_set(InteractionSet::Dispatch));
        app.update();
        Self { app }
    }

    pub fn app(&mut self) -> &mut App {
        &mut self.app
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    /// Run one frame without moving the clock.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Move the clock forward by `by`, one `FRAME` per update.
    pub fn wait(&mut self, by: Duration) {
        let mut remaining = by;
        while !remaining.is_zero() {
            let step = remaining.min(FRAME);
            self.app.world_mut().resource_mut::<Time>().advance_by(step);
            self.app.update();
            remaining -= step;
        }
    }

    /// Update until no lookup or search task is outstanding.
    pub fn settle(&mut self) {
        for _ in 0..500 {
            self.app.update();
            if self.pending_tasks() == 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("{} background tasks never finished", self.pending_tasks());
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn pending_tasks(&self) -> usize {
        let world = self.app.world();
        world.resource::<PendingLookups>().len() + world.resource::<PendingSearches>().len()
    }

    pub fn selections(&self) -> &[PointSelected] {
        &self.app.world().resource::<SelectionLog>().0
    }

    pub fn view(&self) -> &MapView {
        self.app.world().resource::<MapView>()
    }

    pub fn overlay(&self) -> &OverlayController {
        self.app.world().resource::<OverlayController>()
    }

    pub fn overlay_view(&self) -> Option<OverlayView> {
        self.overlay().data().map(OverlayView::derive)
    }

    pub fn search(&self) -> &SearchController {
        self.app.world().resource::<SearchController>()
    }
}
