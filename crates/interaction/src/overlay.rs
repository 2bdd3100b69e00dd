//! The single detail overlay: what it shows and when it opens and closes.
//!
//! Only [`OverlayController`] mutates overlay state. Lookups hold a
//! [`SelectionTicket`] issued when they started; a ticket that is no longer
//! the latest is refused, so a slow lookup can never replace a newer
//! selection.

use std::time::Duration;

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use geodata::{Coordinates, Feature, FeatureKind, FeatureSource, Severity};

use crate::config::InteractionConfig;
use crate::lookup::SelectionEvent;

/// Tags beyond this many are summarised as "+N more".
pub const MAX_VISIBLE_TAGS: usize = 6;

pub const NO_ADDRESS: &str = "No address available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionTicket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayData {
    pub coordinates: Coordinates,
    pub feature: Option<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub visible: bool,
    pub data: Option<OverlayData>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OverlayPhase {
    #[default]
    Closed,
    Open,
    /// Exit animation in progress; still visible until it finishes.
    Closing { since: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayClick {
    Inside,
    Outside,
}

#[derive(Resource, Debug, Default)]
pub struct OverlayController {
    state: OverlayState,
    phase: OverlayPhase,
    latest: u64,
}

impl OverlayController {
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn data(&self) -> Option<&OverlayData> {
        self.state.data.as_ref()
    }

    /// Reserve the next selection slot. Every earlier ticket becomes stale.
    pub fn issue_ticket(&mut self) -> SelectionTicket {
        self.latest += 1;
        SelectionTicket(self.latest)
    }

    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Show `coordinates` immediately, replacing whatever was open and
    /// invalidating outstanding tickets.
    pub fn select(&mut self, coordinates: Coordinates, feature: Option<Feature>) {
        self.latest += 1;
        self.open(coordinates, feature);
    }

    /// Apply a lookup result. Returns false, changing nothing, for a stale
    /// ticket.
    pub fn apply(&mut self, ticket: SelectionTicket, coordinates: Coordinates, feature: Option<Feature>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.open(coordinates, feature);
        true
    }

    fn open(&mut self, coordinates: Coordinates, feature: Option<Feature>) {
        self.state = OverlayState {
            visible: true,
            data: Some(OverlayData { coordinates, feature }),
        };
        self.phase = OverlayPhase::Open;
    }

    /// Start the exit animation. No-op unless open.
    pub fn close(&mut self, now: Duration) {
        if self.phase == OverlayPhase::Open {
            self.phase = OverlayPhase::Closing { since: now };
        }
    }

    pub fn click(&mut self, click: OverlayClick, now: Duration) {
        match click {
            OverlayClick::Outside => self.close(now),
            OverlayClick::Inside => {}
        }
    }

    /// Hide and clear once the exit animation has run for `window`.
    pub fn finish_close(&mut self, now: Duration, window: Duration) -> bool {
        match self.phase {
            OverlayPhase::Closing { since } if now.saturating_sub(since) >= window => {
                self.phase = OverlayPhase::Closed;
                self.state = OverlayState::default();
                true
            }
            _ => false,
        }
    }

    /// 0.0 while open, rising to 1.0 over the exit animation.
    pub fn closing_progress(&self, now: Duration, window: Duration) -> f32 {
        match self.phase {
            OverlayPhase::Open => 0.0,
            OverlayPhase::Closed => 1.0,
            OverlayPhase::Closing { .. } if window.is_zero() => 1.0,
            OverlayPhase::Closing { since } => {
                (now.saturating_sub(since).as_secs_f32() / window.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Display derivation
// ---------------------------------------------------------------------------

/// Fields shared by both feature variants.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub title: String,
    pub kind: FeatureKind,
    pub address: String,
    pub tags: Vec<(String, String)>,
    pub hidden_tags: usize,
}

impl FeatureSummary {
    fn from_feature(feature: &Feature, untitled: &str) -> Self {
        let tags: Vec<(String, String)> = feature
            .tags
            .iter()
            .take(MAX_VISIBLE_TAGS)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            title: feature.name.clone().unwrap_or_else(|| untitled.to_string()),
            kind: feature.kind,
            address: feature.address.clone().unwrap_or_else(|| NO_ADDRESS.to_string()),
            hidden_tags: feature.tags.len().saturating_sub(MAX_VISIBLE_TAGS),
            tags,
        }
    }
}

/// What the overlay renders. Exactly one variant applies to any data.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayView {
    Empty {
        coordinates: String,
    },
    External {
        summary: FeatureSummary,
        coordinates: String,
        version: u32,
        last_editor: Option<String>,
    },
    UserSubmitted {
        summary: FeatureSummary,
        coordinates: String,
        severity: Severity,
        expires_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    AddPoi,
    CorrectPoi,
    AddWarning,
    CorrectWarning,
}

impl OverlayAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::AddPoi => "Add POI",
            Self::CorrectPoi => "Correct POI",
            Self::AddWarning => "Add Warning",
            Self::CorrectWarning => "Correct Warning",
        }
    }
}

impl OverlayView {
    pub fn derive(data: &OverlayData) -> Self {
        let coordinates = data.coordinates.format_fixed();
        let Some(feature) = &data.feature else {
            return Self::Empty { coordinates };
        };
        match &feature.source {
            FeatureSource::UserSubmitted {
                severity,
                expires_at,
                ..
            } => Self::UserSubmitted {
                summary: FeatureSummary::from_feature(feature, "Unnamed Warning"),
                coordinates,
                severity: *severity,
                expires_at: *expires_at,
            },
            FeatureSource::External {
                version,
                last_editor,
                ..
            } => Self::External {
                summary: FeatureSummary::from_feature(feature, "Unnamed POI"),
                coordinates,
                version: *version,
                last_editor: last_editor.clone(),
            },
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Empty { .. } => "No detail",
            Self::External { summary, .. } | Self::UserSubmitted { summary, .. } => &summary.title,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Empty { .. } => FeatureKind::Other.label(),
            Self::External { summary, .. } | Self::UserSubmitted { summary, .. } => summary.kind.label(),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Empty { .. } => NO_ADDRESS,
            Self::External { summary, .. } | Self::UserSubmitted { summary, .. } => &summary.address,
        }
    }

    pub fn coordinates(&self) -> &str {
        match self {
            Self::Empty { coordinates }
            | Self::External { coordinates, .. }
            | Self::UserSubmitted { coordinates, .. } => coordinates,
        }
    }

    pub fn source_label(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "No Data",
            Self::External { .. } => "OpenStreetMap",
            Self::UserSubmitted { .. } => "Private Warning",
        }
    }

    /// The POI button and the warning button, in that order.
    pub fn actions(&self) -> [OverlayAction; 2] {
        match self {
            Self::Empty { .. } => [OverlayAction::AddPoi, OverlayAction::AddWarning],
            Self::External { .. } => [OverlayAction::CorrectPoi, OverlayAction::AddWarning],
            Self::UserSubmitted { .. } => [OverlayAction::AddPoi, OverlayAction::CorrectWarning],
        }
    }
}

// ---------------------------------------------------------------------------
// Events and systems
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum OverlayCommand {
    Click(OverlayClick),
    Close,
    Action(OverlayAction),
}

pub fn apply_selection_events(mut events: EventReader<SelectionEvent>, mut overlay: ResMut<OverlayController>) {
    for event in events.read() {
        if overlay.apply(event.ticket, event.coordinates, event.feature.clone()) {
            debug!(
                "Overlay open at {} ({})",
                event.coordinates.format_fixed(),
                if event.feature.is_some() { "feature" } else { "no feature" }
            );
        } else {
            debug!("Dropped stale selection {:?}", event.ticket);
        }
    }
}

pub fn handle_overlay_commands(
    mut commands: EventReader<OverlayCommand>,
    time: Res<Time>,
    mut overlay: ResMut<OverlayController>,
) {
    let now = time.elapsed();
    for command in commands.read() {
        match command {
            OverlayCommand::Click(click) => overlay.click(*click, now),
            OverlayCommand::Close => overlay.close(now),
            OverlayCommand::Action(action) => {
                warn!("{} is not available yet", action.label());
                overlay.close(now);
            }
        }
    }
}

pub fn finish_overlay_close(
    time: Res<Time>,
    config: Res<InteractionConfig>,
    mut overlay: ResMut<OverlayController>,
) {
    if matches!(overlay.phase(), OverlayPhase::Closing { .. }) {
        overlay.finish_close(time.elapsed(), config.overlay.close_animation());
    }
}
