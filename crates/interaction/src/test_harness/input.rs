//! Simulated user input for `TestMap`.

use std::time::Duration;

use geodata::Coordinates;

use super::TestMap;
use crate::arbiter::{PointSelected, SelectionOrigin};
use crate::overlay::{OverlayClick, OverlayCommand};
use crate::pointer::{PointerInput, PointerPhase, PointerSource};
use crate::search::SearchCommand;

pub const FINGER: PointerSource = PointerSource::Touch(1);

impl TestMap {
    /// Queue one pointer event; it is handled on the next update.
    pub fn pointer(&mut self, phase: PointerPhase, source: PointerSource, at: Coordinates) {
        let screen = self.view().geo_to_screen(at);
        self.app
            .world_mut()
            .send_event(PointerInput::new(phase, source, screen, at));
    }

    /// Press at `start`, hold for `held`, release at `end`. With `moved`, one
    /// move event fires halfway through.
    pub fn gesture(
        &mut self,
        source: PointerSource,
        start: Coordinates,
        end: Coordinates,
        held: Duration,
        moved: bool,
    ) {
        self.pointer(PointerPhase::Down, source, start);
        self.update();
        if moved {
            self.wait(held / 2);
            self.pointer(PointerPhase::Move, source, end);
            self.update();
            self.wait(held - held / 2);
        } else {
            self.wait(held);
        }
        self.pointer(PointerPhase::Up, source, end);
        self.update();
    }

    pub fn touch_tap(&mut self, at: Coordinates) {
        self.gesture(FINGER, at, at, Duration::from_millis(80), false);
    }

    /// A mouse click, including the settle delay after release.
    pub fn mouse_click(&mut self, at: Coordinates) {
        self.gesture(PointerSource::Mouse, at, at, Duration::from_millis(80), false);
        let settle = self.app.world().resource::<crate::InteractionConfig>().gestures.mouse_settle();
        self.wait(settle);
    }

    /// Request a selection directly, as picking a search result does.
    pub fn select_point(&mut self, at: Coordinates) {
        self.app.world_mut().send_event(PointSelected {
            coordinates: at,
            origin: SelectionOrigin::SearchResult,
        });
    }

    pub fn overlay_command(&mut self, command: OverlayCommand) {
        self.app.world_mut().send_event(command);
        self.update();
    }

    pub fn click_outside_overlay(&mut self) {
        self.overlay_command(OverlayCommand::Click(OverlayClick::Outside));
    }

    /// Type `text` one keystroke at a time, `gap` apart.
    pub fn type_query(&mut self, text: &str, gap: Duration) {
        let mut typed = String::new();
        for c in text.chars() {
            typed.push(c);
            self.search_command(SearchCommand::Input(typed.clone()));
            self.wait(gap);
        }
    }

    pub fn search_command(&mut self, command: SearchCommand) {
        self.app.world_mut().send_event(command);
        self.update();
    }
}
