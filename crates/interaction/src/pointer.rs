use bevy::prelude::*;
use geodata::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

/// Which device produced the event. Touches carry their finger id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch(u64),
}

impl PointerSource {
    pub fn is_touch(self) -> bool {
        matches!(self, PointerSource::Touch(_))
    }
}

/// One pointer event over the map surface, already projected to map
/// coordinates. Events swallowed by UI panels never become a
/// `PointerInput`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub source: PointerSource,
    /// Logical pixels, top-left origin.
    pub screen: Vec2,
    pub coordinates: Coordinates,
}

impl PointerInput {
    pub fn new(phase: PointerPhase, source: PointerSource, screen: Vec2, coordinates: Coordinates) -> Self {
        Self {
            phase,
            source,
            screen,
            coordinates,
        }
    }
}
