//! Map interaction core: gesture arbitration, feature lookup, the detail
//! overlay and place search, as a headless Bevy plugin.
//!
//! # Update phases (`InteractionSet`)
//!
//! ```text
//! Input  →  Gestures  →  Dispatch  →  Resolve  →  Apply
//! ```
//!
//! * **Input** – config sync and commands sent by the UI (session, search,
//!   overlay).
//! * **Gestures** – pointer events: panning and tap classification.
//! * **Dispatch** – accepted selections and due searches start background
//!   tasks.
//! * **Resolve** – finished tasks are turned into events.
//! * **Apply** – overlay and map state catch up.
//!
//! The UI feeds `PointerInput` and commands before `Input` and paints after
//! `Apply`, so one frame carries a tap all the way to a lookup request.

use bevy::prelude::*;

pub mod activity;
pub mod arbiter;
pub mod config;
pub mod lookup;
pub mod map_view;
pub mod overlay;
pub mod pointer;
pub mod search;
pub mod session;

#[cfg(test)]
pub(crate) mod test_harness;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use arbiter::{GestureArbiter, GestureOutcome, GestureThresholds, PointSelected, SelectionOrigin};
pub use config::{ConfigIssue, InteractionConfig};
pub use lookup::{GeoServices, PendingLookups, SelectionEvent};
pub use map_view::{MapFlight, MapView};
pub use overlay::{OverlayAction, OverlayClick, OverlayCommand, OverlayController, OverlayView};
pub use pointer::{PointerInput, PointerPhase, PointerSource};
pub use search::{PendingSearches, SearchCommand, SearchController, SearchResultsUpdated};
pub use session::{CurrentSession, SessionCommand};

/// Ordered phases for interaction systems in the `Update` schedule.
///
/// Configured as a chain: `Input` → `Gestures` → `Dispatch` → `Resolve` →
/// `Apply`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InteractionSet {
    Input,
    Gestures,
    Dispatch,
    Resolve,
    Apply,
}

/// Registers every interaction resource, event and system.
///
/// An `InteractionConfig` or `GeoServices` inserted before the plugin is
/// kept; otherwise defaults and offline collaborators are used.
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionConfig>();
        let config = app.world().resource::<InteractionConfig>().clone();

        if !app.world().contains_resource::<GeoServices>() {
            warn!("No geo services configured, running offline");
            app.insert_resource(GeoServices::offline());
        }

        app.insert_resource(MapView::from_config(&config.map))
            .insert_resource(GestureArbiter::new(GestureThresholds::from(&config.gestures)))
            .insert_resource(SearchController::new(&config.search))
            .init_resource::<MapFlight>()
            .init_resource::<OverlayController>()
            .init_resource::<PendingLookups>()
            .init_resource::<PendingSearches>()
            .init_resource::<ActivityLog>()
            .init_resource::<CurrentSession>()
            .add_event::<PointerInput>()
            .add_event::<PointSelected>()
            .add_event::<SelectionEvent>()
            .add_event::<OverlayCommand>()
            .add_event::<SearchCommand>()
            .add_event::<SearchResultsUpdated>()
            .add_event::<SessionCommand>();

        app.configure_sets(
            Update,
            (
                InteractionSet::Input,
                InteractionSet::Gestures,
                InteractionSet::Dispatch,
                InteractionSet::Resolve,
                InteractionSet::Apply,
            )
                .chain(),
        );

        app.add_systems(Startup, config::report_config_issue);

        app.add_systems(
            Update,
            (
                (
                    arbiter::sync_gesture_thresholds,
                    search::sync_search_settings,
                    session::handle_session_commands,
                    search::handle_search_commands,
                    overlay::handle_overlay_commands,
                )
                    .in_set(InteractionSet::Input),
                (
                    map_view::pan_map_with_pointer,
                    arbiter::arbitrate_pointer_input,
                    arbiter::resolve_mouse_settle,
                )
                    .chain()
                    .in_set(InteractionSet::Gestures),
                (
                    map_view::fly_to_selection,
                    lookup::spawn_feature_lookups,
                    search::dispatch_due_search,
                )
                    .in_set(InteractionSet::Dispatch),
                (lookup::poll_feature_lookups, search::poll_search_tasks).in_set(InteractionSet::Resolve),
                (
                    overlay::apply_selection_events,
                    search::frame_search_results,
                    overlay::finish_overlay_close,
                    map_view::advance_map_flight,
                )
                    .chain()
                    .in_set(InteractionSet::Apply),
            ),
        );
    }
}
