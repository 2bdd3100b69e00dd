//! Top search bar and its result dropdown.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use geodata::{Place, StructuredAddress};
use interaction::{SearchCommand, SearchController};

const INPUT_WIDTH: f32 = 360.0;
const DROPDOWN_WIDTH: f32 = 420.0;

/// Screen areas that count as "inside" the search UI, from the last paint.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SearchBarRects {
    pub input: Option<egui::Rect>,
    pub dropdown: Option<egui::Rect>,
}

impl SearchBarRects {
    pub fn contains(&self, pos: egui::Pos2) -> bool {
        [self.input, self.dropdown]
            .into_iter()
            .flatten()
            .any(|rect| rect.contains(pos))
    }
}

pub fn result_address(place: &Place) -> Option<String> {
    place.address.as_ref().and_then(StructuredAddress::summary)
}

pub fn result_subtitle(place: &Place) -> String {
    format!("{} • Importance: {:.2}", place.category, place.importance)
}

pub fn search_bar_ui(
    mut contexts: EguiContexts,
    search: Res<SearchController>,
    mut rects: ResMut<SearchBarRects>,
    mut commands: EventWriter<SearchCommand>,
) {
    let ctx = contexts.ctx_mut();

    egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("🔍");
            let mut text = search.query.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut text)
                    .hint_text("Search places...")
                    .desired_width(INPUT_WIDTH),
            );
            if response.changed() {
                commands.send(SearchCommand::Input(text));
            }
            rects.input = Some(response.rect);
            if search.searching {
                ui.spinner();
            }
            if !search.query.is_empty() && ui.small_button("✕").clicked() {
                commands.send(SearchCommand::Clear);
            }
        });
    });

    if !search.dropdown_open {
        rects.dropdown = None;
        return;
    }
    let Some(input) = rects.input else {
        return;
    };

    let area = egui::Area::new(egui::Id::new("search_dropdown"))
        .order(egui::Order::Foreground)
        .fixed_pos(input.left_bottom() + egui::vec2(0.0, 4.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(DROPDOWN_WIDTH);
                if search.results.is_empty() {
                    if search.searching {
                        ui.weak("Searching...");
                    } else {
                        ui.label("No results found");
                    }
                    return;
                }
                egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    for (i, place) in search.results.iter().enumerate() {
                        let row = ui
                            .scope(|ui| {
                                ui.label(egui::RichText::new(format!("{}. {}", i + 1, place.display_name)).strong());
                                if let Some(address) = result_address(place) {
                                    ui.small(address);
                                }
                                ui.weak(result_subtitle(place));
                            })
                            .response
                            .interact(egui::Sense::click());
                        if row.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if row.clicked() {
                            commands.send(SearchCommand::SelectResult(i));
                        }
                        ui.separator();
                    }
                });
            });
        });
    rects.dropdown = Some(area.response.rect);
}

/// A press anywhere outside the bar and dropdown closes the dropdown.
pub fn close_dropdown_on_outside_click(
    mut contexts: EguiContexts,
    search: Res<SearchController>,
    rects: Res<SearchBarRects>,
    mut commands: EventWriter<SearchCommand>,
) {
    if !search.dropdown_open {
        return;
    }
    let ctx = contexts.ctx_mut();
    if !ctx.input(|i| i.pointer.any_pressed()) {
        return;
    }
    if let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) {
        if !rects.contains(pos) {
            commands.send(SearchCommand::ClickOutside);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodata::Coordinates;

    fn place(address: Option<StructuredAddress>) -> Place {
        Place {
            id: "1".into(),
            display_name: "Paris, France".into(),
            coordinates: Coordinates::new(48.8566, 2.3522),
            category: "city".into(),
            importance: 0.9657,
            address,
        }
    }

    #[test]
    fn test_result_subtitle() {
        assert_eq!(result_subtitle(&place(None)), "city • Importance: 0.97");
    }

    #[test]
    fn test_result_address() {
        assert_eq!(result_address(&place(None)), None);
        let address = StructuredAddress {
            city: Some("Paris".into()),
            country: Some("France".into()),
            ..Default::default()
        };
        assert_eq!(result_address(&place(Some(address))).as_deref(), Some("Paris, France"));
    }

    #[test]
    fn test_rects_contains() {
        let rects = SearchBarRects {
            input: Some(egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 20.0))),
            dropdown: None,
        };
        assert!(rects.contains(egui::pos2(50.0, 10.0)));
        assert!(!rects.contains(egui::pos2(50.0, 40.0)));
        assert!(!SearchBarRects::default().contains(egui::pos2(0.0, 0.0)));
    }
}
