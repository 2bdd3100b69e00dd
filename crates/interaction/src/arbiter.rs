//! Tap-versus-navigation arbitration for pointer gestures on the map.
//!
//! A gesture runs from pointer-down to pointer-up (or leave/cancel). It is a
//! tap only when it was short, never moved and ended where it started;
//! anything else was a pan or zoom and produces nothing. Mouse taps are
//! confirmed a moment later by checking that the map did not start moving
//! underneath them.
//!
//! The arbiter never waits on feature lookups: it emits [`PointSelected`] and
//! is immediately idle again.

use std::time::Duration;

use bevy::prelude::*;
use geodata::Coordinates;

use crate::config::{GestureConfig, InteractionConfig};
use crate::map_view::MapView;
use crate::pointer::{PointerInput, PointerPhase, PointerSource};

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    Gesture,
    SearchResult,
}

/// A point the user intentionally picked. Feeds the feature lookup.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointSelected {
    pub coordinates: Coordinates,
    pub origin: SelectionOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    pub max_duration: Duration,
    pub max_distance_deg: f64,
    pub mouse_settle: Duration,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureThresholds {
    fn from(config: &GestureConfig) -> Self {
        Self {
            max_duration: config.max_tap_duration(),
            max_distance_deg: config.max_tap_distance_deg,
            mouse_settle: config.mouse_settle(),
        }
    }
}

/// State of the gesture in progress. `start_coordinates` is never written
/// after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub source: PointerSource,
    pub start_time: Duration,
    pub start_coordinates: Coordinates,
    pub is_dragging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Active(GestureSample),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Tap(Coordinates),
    Navigation,
    /// The event did not belong to the current gesture.
    Ignored,
}

/// A mouse tap waiting for the settle delay before it is confirmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSettle {
    pub coordinates: Coordinates,
    pub released_at: Duration,
    pub center_at_release: Coordinates,
}

#[derive(Resource, Debug, Default)]
pub struct GestureArbiter {
    phase: GesturePhase,
    pending: Option<PendingSettle>,
    pub thresholds: GestureThresholds,
}

impl GestureArbiter {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            phase: GesturePhase::Idle,
            pending: None,
            thresholds,
        }
    }

    pub fn phase(&self) -> &GesturePhase {
        &self.phase
    }

    pub fn pending_settle(&self) -> Option<&PendingSettle> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, GesturePhase::Idle)
    }

    /// Start a gesture. A press while another gesture is active is ignored.
    /// A new gesture drops any mouse tap still waiting to settle.
    pub fn pointer_down(&mut self, source: PointerSource, at: Coordinates, now: Duration) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.pending = None;
        self.phase = GesturePhase::Active(GestureSample {
            source,
            start_time: now,
            start_coordinates: at,
            is_dragging: false,
        });
        true
    }

    /// Any movement of the gesture's pointer marks it as a drag.
    pub fn pointer_move(&mut self, source: PointerSource) {
        if let GesturePhase::Active(sample) = &mut self.phase {
            if sample.source == source {
                sample.is_dragging = true;
            }
        }
    }

    /// End the gesture and classify it.
    pub fn pointer_up(&mut self, source: PointerSource, end: Coordinates, now: Duration) -> GestureOutcome {
        let GesturePhase::Active(sample) = self.phase else {
            return GestureOutcome::Ignored;
        };
        if sample.source != source {
            return GestureOutcome::Ignored;
        }
        self.phase = GesturePhase::Idle;

        if self.is_tap(&sample, end, now) {
            GestureOutcome::Tap(end)
        } else {
            GestureOutcome::Navigation
        }
    }

    /// Leave/cancel: drop the gesture without an outcome.
    pub fn cancel(&mut self, source: PointerSource) -> bool {
        match self.phase {
            GesturePhase::Active(sample) if sample.source == source => {
                self.phase = GesturePhase::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn is_tap(&self, sample: &GestureSample, end: Coordinates, now: Duration) -> bool {
        let duration = now.saturating_sub(sample.start_time);
        let distance = end.planar_distance(&sample.start_coordinates);
        duration < self.thresholds.max_duration
            && !sample.is_dragging
            && distance < self.thresholds.max_distance_deg
    }

    /// Mouse taps go through the settle check; touch taps do not.
    pub fn needs_settle(&self, source: PointerSource) -> bool {
        !source.is_touch() && !self.thresholds.mouse_settle.is_zero()
    }

    pub fn defer(&mut self, coordinates: Coordinates, now: Duration, map_center: Coordinates) {
        self.pending = Some(PendingSettle {
            coordinates,
            released_at: now,
            center_at_release: map_center,
        });
    }

    /// Resolve a waiting mouse tap once the settle delay has passed. A map
    /// center that drifted past the distance threshold means a pan or fly
    /// animation took over.
    pub fn poll_settle(&mut self, now: Duration, map_center: Coordinates) -> Option<GestureOutcome> {
        let pending = self.pending?;
        if now.saturating_sub(pending.released_at) < self.thresholds.mouse_settle {
            return None;
        }
        self.pending = None;
        let drift = map_center.planar_distance(&pending.center_at_release);
        if drift < self.thresholds.max_distance_deg {
            Some(GestureOutcome::Tap(pending.coordinates))
        } else {
            Some(GestureOutcome::Navigation)
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn sync_gesture_thresholds(config: Res<InteractionConfig>, mut arbiter: ResMut<GestureArbiter>) {
    if config.is_changed() {
        arbiter.thresholds = GestureThresholds::from(&config.gestures);
    }
}

pub fn arbitrate_pointer_input(
    mut events: EventReader<PointerInput>,
    time: Res<Time>,
    view: Res<MapView>,
    mut arbiter: ResMut<GestureArbiter>,
    mut selected: EventWriter<PointSelected>,
) {
    let now = time.elapsed();
    for event in events.read() {
        match event.phase {
            PointerPhase::Down => {
                arbiter.pointer_down(event.source, event.coordinates, now);
            }
            PointerPhase::Move => arbiter.pointer_move(event.source),
            PointerPhase::Up => match arbiter.pointer_up(event.source, event.coordinates, now) {
                GestureOutcome::Tap(at) if arbiter.needs_settle(event.source) => {
                    debug!("Mouse tap at {}, settling", at.format_fixed());
                    arbiter.defer(at, now, view.center);
                }
                GestureOutcome::Tap(at) => {
                    debug!("Tap at {}", at.format_fixed());
                    selected.send(PointSelected {
                        coordinates: at,
                        origin: SelectionOrigin::Gesture,
                    });
                }
                GestureOutcome::Navigation => debug!("Gesture classified as navigation"),
                GestureOutcome::Ignored => {}
            },
            PointerPhase::Leave | PointerPhase::Cancel => {
                if arbiter.cancel(event.source) {
                    debug!("Gesture discarded ({:?})", event.phase);
                }
            }
        }
    }
}

pub fn resolve_mouse_settle(
    time: Res<Time>,
    view: Res<MapView>,
    mut arbiter: ResMut<GestureArbiter>,
    mut selected: EventWriter<PointSelected>,
) {
    match arbiter.poll_settle(time.elapsed(), view.center) {
        Some(GestureOutcome::Tap(at)) => {
            debug!("Mouse tap at {} confirmed", at.format_fixed());
            selected.send(PointSelected {
                coordinates: at,
                origin: SelectionOrigin::Gesture,
            });
        }
        Some(_) => debug!("Map moved during settle, tap dropped"),
        None => {}
    }
}
