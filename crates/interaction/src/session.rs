//! Current signed-in identity. Only anonymous sign-in is handled in-process.

use bevy::prelude::*;
use geodata::{UserId, UserProfile};

use crate::map_view::{MapFlight, MapView};

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct CurrentSession(pub Option<UserProfile>);

impl CurrentSession {
    pub fn uid(&self) -> Option<&UserId> {
        self.0.as_ref().map(|p| &p.uid)
    }

    pub fn is_signed_in(&self) -> bool {
        self.0.is_some()
    }

    /// Label for the session badge.
    pub fn label(&self) -> &str {
        self.0.as_ref().map_or("Sign In", UserProfile::display_label)
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    SignInAnonymously,
    SignOut,
}

/// Jump to the profile's preferred zoom, keeping the center.
pub fn apply_preferences(profile: &UserProfile, view: &mut MapView, flight: &mut MapFlight) {
    let target = f64::from(profile.preferences.default_zoom);
    if target.is_finite() && target != view.zoom {
        flight.cancel();
        let center = view.viewport / 2.0;
        let delta = target - view.zoom;
        view.zoom_around(center, delta);
    }
}

pub fn handle_session_commands(
    mut commands: EventReader<SessionCommand>,
    mut session: ResMut<CurrentSession>,
    mut view: ResMut<MapView>,
    mut flight: ResMut<MapFlight>,
) {
    for command in commands.read() {
        match command {
            SessionCommand::SignInAnonymously => {
                if session.is_signed_in() {
                    continue;
                }
                let profile = UserProfile::anonymous(&mut rand::thread_rng());
                info!("Signed in anonymously as {}", profile.uid);
                apply_preferences(&profile, &mut view, &mut flight);
                session.0 = Some(profile);
            }
            SessionCommand::SignOut => {
                if let Some(profile) = session.0.take() {
                    info!("Signed out {}", profile.uid);
                }
            }
        }
    }
}
