//! Bounded log of service calls made by the lookup and search bridges, shown
//! by the debug panel.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;

pub const MAX_ACTIVITY_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Request,
    Response,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    /// App elapsed time when recorded.
    pub at: Duration,
    pub service: &'static str,
    pub kind: ActivityKind,
    pub message: String,
    /// Round-trip time for responses and failures.
    pub duration: Option<Duration>,
}

/// Newest entry first.
#[derive(Resource, Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn record(&mut self, entry: ActivityEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(MAX_ACTIVITY_ENTRIES);
    }

    pub fn request(&mut self, at: Duration, service: &'static str, message: impl Into<String>) {
        self.record(ActivityEntry {
            at,
            service,
            kind: ActivityKind::Request,
            message: message.into(),
            duration: None,
        });
    }

    pub fn response(&mut self, at: Duration, service: &'static str, message: impl Into<String>, took: Duration) {
        self.record(ActivityEntry {
            at,
            service,
            kind: ActivityKind::Response,
            message: message.into(),
            duration: Some(took),
        });
    }

    pub fn failure(&mut self, at: Duration, service: &'static str, message: impl Into<String>, took: Duration) {
        self.record(ActivityEntry {
            at,
            service,
            kind: ActivityKind::Failure,
            message: message.into(),
            duration: Some(took),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
