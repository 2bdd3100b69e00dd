//! Map camera: center, zoom and the Web Mercator projection between screen
//! pixels and coordinates.
//!
//! Screen space is logical pixels with the origin at the top-left of the
//! viewport and y growing downwards, the same convention as window cursor
//! positions.

use std::f64::consts::PI;
use std::time::Duration;

use bevy::math::DVec2;
use bevy::prelude::*;
use geodata::{BoundingBox, Coordinates};

use crate::arbiter::PointSelected;
use crate::config::{InteractionConfig, MapConfig};
use crate::pointer::{PointerInput, PointerPhase, PointerSource};

/// Side of one map tile in pixels; the world is `TILE_SIZE · 2^zoom` wide.
pub const TILE_SIZE: f64 = 256.0;
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Coordinates to world pixels at `zoom`.
pub fn project(c: Coordinates, zoom: f64) -> DVec2 {
    let size = world_size(zoom);
    let lat = c.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (c.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    DVec2::new(x, y)
}

/// World pixels at `zoom` back to coordinates. Longitude wraps into
/// [-180, 180); latitude is clamped to the Mercator range.
pub fn unproject(p: DVec2, zoom: f64) -> Coordinates {
    let size = world_size(zoom);
    let lng = wrap_lng(p.x / size * 360.0 - 180.0);
    let n = PI - 2.0 * PI * p.y / size;
    let lat = n.sinh().atan().to_degrees();
    Coordinates::new(lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT), lng)
}

pub fn wrap_lng(lng: f64) -> f64 {
    if (-180.0..180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

// ---------------------------------------------------------------------------
// MapView
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: f64,
    /// Viewport size in logical pixels.
    pub viewport: Vec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}

impl MapView {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            center: config.default_center,
            zoom: config.default_zoom,
            viewport: Vec2::new(1280.0, 720.0),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    fn half_viewport(&self) -> DVec2 {
        self.viewport.as_dvec2() / 2.0
    }

    pub fn screen_to_geo(&self, screen: Vec2) -> Coordinates {
        let center = project(self.center, self.zoom);
        unproject(center + screen.as_dvec2() - self.half_viewport(), self.zoom)
    }

    pub fn geo_to_screen(&self, c: Coordinates) -> Vec2 {
        let offset = project(c, self.zoom) - project(self.center, self.zoom);
        (offset + self.half_viewport()).as_vec2()
    }

    /// Longitude under screen column `x`, not wrapped, so the visible span
    /// stays ordered across the antimeridian.
    pub fn unwrapped_lng_at(&self, x: f32) -> f64 {
        let center = project(self.center, self.zoom);
        (center.x + f64::from(x) - self.half_viewport().x) / world_size(self.zoom) * 360.0 - 180.0
    }

    /// Screen column of an unwrapped longitude.
    pub fn screen_x_of_lng(&self, lng: f64) -> f32 {
        let center = project(self.center, self.zoom);
        ((lng + 180.0) / 360.0 * world_size(self.zoom) - center.x + self.half_viewport().x) as f32
    }

    /// Move the map so its content follows a pointer dragged by `delta`.
    pub fn pan_by_pixels(&mut self, delta: Vec2) {
        let center = project(self.center, self.zoom);
        self.center = unproject(center - delta.as_dvec2(), self.zoom);
    }

    /// Change zoom by `delta` levels keeping the point under `screen` fixed.
    pub fn zoom_around(&mut self, screen: Vec2, delta: f64) {
        let anchor = self.screen_to_geo(screen);
        let zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        let anchor_px = project(anchor, zoom);
        let offset = screen.as_dvec2() - self.half_viewport();
        self.center = unproject(anchor_px - offset, zoom);
    }

    /// Center and zoom that show `bbox` inside the viewport less `padding`
    /// on every side, never zooming past `max_zoom`.
    pub fn fit_bounds(&self, bbox: &BoundingBox, padding: f32, max_zoom: f64) -> (Coordinates, f64) {
        let nw = project(Coordinates::new(bbox.north, bbox.west), 0.0);
        let se = project(Coordinates::new(bbox.south, bbox.east), 0.0);
        let span = (se - nw).abs();
        let room = (self.viewport - Vec2::splat(2.0 * padding)).max(Vec2::ONE).as_dvec2();

        let zoom_x = if span.x > 0.0 { (room.x / span.x).log2() } else { f64::INFINITY };
        let zoom_y = if span.y > 0.0 { (room.y / span.y).log2() } else { f64::INFINITY };
        let upper = max_zoom.min(self.max_zoom);
        let zoom = zoom_x.min(zoom_y).min(upper).max(self.min_zoom);

        let center = unproject((nw + se) / 2.0, 0.0);
        (center, zoom)
    }
}

// ---------------------------------------------------------------------------
// MapFlight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Flight {
    from_center: Coordinates,
    from_zoom: f64,
    to_center: Coordinates,
    to_zoom: f64,
    started: Duration,
    duration: Duration,
}

/// Eased camera animation. At most one flight runs; starting another
/// replaces it.
#[derive(Resource, Debug, Default)]
pub struct MapFlight {
    active: Option<Flight>,
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl MapFlight {
    pub fn fly_to(&mut self, view: &MapView, target: Coordinates, zoom: f64, now: Duration, duration: Duration) {
        self.active = Some(Flight {
            from_center: view.center,
            from_zoom: view.zoom,
            to_center: target,
            to_zoom: zoom.clamp(view.min_zoom, view.max_zoom),
            started: now,
            duration,
        });
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Move `view` to where the flight should be at `now`. Returns false
    /// once no flight is running.
    pub fn advance(&mut self, view: &mut MapView, now: Duration) -> bool {
        let Some(flight) = &self.active else {
            return false;
        };
        let elapsed = now.saturating_sub(flight.started);
        let t = if flight.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / flight.duration.as_secs_f64()
        };
        let k = smoothstep(t);
        let lerp = |a: f64, b: f64| a + (b - a) * k;

        view.center = Coordinates::new(
            lerp(flight.from_center.lat, flight.to_center.lat),
            lerp(flight.from_center.lng, flight.to_center.lng),
        );
        view.zoom = lerp(flight.from_zoom, flight.to_zoom);

        if t >= 1.0 {
            view.center = flight.to_center;
            view.zoom = flight.to_zoom;
            self.active = None;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Drag to pan. Follows the pointer that pressed first, like the arbiter.
pub fn pan_map_with_pointer(
    mut events: EventReader<PointerInput>,
    mut dragging: Local<Option<(PointerSource, Vec2)>>,
    mut view: ResMut<MapView>,
    mut flight: ResMut<MapFlight>,
) {
    for event in events.read() {
        match event.phase {
            PointerPhase::Down => {
                if dragging.is_none() {
                    *dragging = Some((event.source, event.screen));
                }
            }
            PointerPhase::Move => {
                if let Some((source, last)) = dragging.as_mut() {
                    if *source == event.source {
                        let delta = event.screen - *last;
                        *last = event.screen;
                        if delta != Vec2::ZERO {
                            flight.cancel();
                            view.pan_by_pixels(delta);
                        }
                    }
                }
            }
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => {
                if dragging.is_some_and(|(source, _)| source == event.source) {
                    *dragging = None;
                }
            }
        }
    }
}

pub fn advance_map_flight(time: Res<Time>, mut flight: ResMut<MapFlight>, mut view: ResMut<MapView>) {
    if flight.is_active() {
        flight.advance(&mut view, time.elapsed());
    }
}

/// Every accepted selection centers the map on the point.
pub fn fly_to_selection(
    mut events: EventReader<PointSelected>,
    time: Res<Time>,
    config: Res<InteractionConfig>,
    view: Res<MapView>,
    mut flight: ResMut<MapFlight>,
) {
    if let Some(selected) = events.read().last() {
        flight.fly_to(
            &view,
            selected.coordinates,
            config.overlay.selection_zoom,
            time.elapsed(),
            config.map.flight(),
        );
    }
}
