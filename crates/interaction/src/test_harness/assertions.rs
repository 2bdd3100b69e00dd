//! Assertion helpers for `TestMap` integration tests.

use geodata::Coordinates;

use super::TestMap;
use crate::arbiter::SelectionOrigin;

impl TestMap {
    /// Assert the gesture path produced exactly these selections, in order.
    pub fn assert_selected(&self, expected: &[Coordinates]) {
        let got: Vec<Coordinates> = self
            .selections()
            .iter()
            .filter(|s| s.origin == SelectionOrigin::Gesture)
            .map(|s| s.coordinates)
            .collect();
        assert_eq!(got, expected, "Expected selections {expected:?}, got {got:?}");
    }

    pub fn assert_no_selection(&self) {
        let count = self.selections().len();
        assert_eq!(count, 0, "Expected no selection, got {count}: {:?}", self.selections());
    }

    /// Assert the overlay is visible and shows `at`.
    pub fn assert_overlay_at(&self, at: Coordinates) {
        let overlay = self.overlay();
        assert!(overlay.is_visible(), "Expected overlay open at {}", at.format_fixed());
        let shown = overlay.data().map(|d| d.coordinates);
        assert_eq!(shown, Some(at), "Expected overlay at {at:?}, shows {shown:?}");
    }

    pub fn assert_overlay_hidden(&self) {
        let overlay = self.overlay();
        assert!(
            !overlay.is_visible() && overlay.data().is_none(),
            "Expected overlay hidden, phase {:?}",
            overlay.phase()
        );
    }

    pub fn assert_overlay_title(&self, title: &str) {
        let view = self.overlay_view();
        let got = view.as_ref().map(|v| v.title());
        assert_eq!(got, Some(title), "Expected overlay titled {title:?}, got {got:?}");
    }
}
