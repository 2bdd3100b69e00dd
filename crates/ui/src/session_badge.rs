//! Top-right identity badge.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use interaction::{CurrentSession, SessionCommand};

pub fn session_badge_ui(
    mut contexts: EguiContexts,
    session: Res<CurrentSession>,
    mut commands: EventWriter<SessionCommand>,
) {
    egui::Area::new(egui::Id::new("session_badge"))
        .order(egui::Order::Foreground)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 6.0))
        .show(contexts.ctx_mut(), |ui| {
            if !session.is_signed_in() {
                if ui.button(session.label()).clicked() {
                    commands.send(SessionCommand::SignInAnonymously);
                }
                return;
            }
            ui.menu_button(format!("👤 {}", session.label()), |ui| {
                if let Some(uid) = session.uid() {
                    ui.weak(uid.as_str());
                }
                if ui.button("Sign out").clicked() {
                    commands.send(SessionCommand::SignOut);
                    ui.close_menu();
                }
            });
        });
}
