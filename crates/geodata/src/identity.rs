//! Signed-in user identity and profile.
//!
//! Interactive sign-in providers live outside this crate; what's here is the
//! value the rest of the app sees once a session exists.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opaque user identifier issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Zoom the map jumps to when the session starts.
    pub default_zoom: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { default_zoom: 13.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_anonymous: bool,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Length of the random part of an anonymous uid.
const ANONYMOUS_UID_LEN: usize = 20;

impl UserProfile {
    /// A fresh anonymous identity with default preferences.
    pub fn anonymous<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..ANONYMOUS_UID_LEN)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect();
        Self {
            uid: UserId(format!("anon-{suffix}")),
            email: None,
            display_name: None,
            is_anonymous: true,
            preferences: Preferences::default(),
        }
    }

    /// Display name, else email, else "User".
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_preferences_defaults() {
        assert_eq!(Preferences::default().default_zoom, 13.0);
        let p: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Preferences::default());
    }

    #[test]
    fn test_anonymous_profiles_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = UserProfile::anonymous(&mut rng);
        let b = UserProfile::anonymous(&mut rng);
        assert!(a.is_anonymous);
        assert!(a.uid.as_str().starts_with("anon-"));
        assert_eq!(a.uid.as_str().len(), "anon-".len() + ANONYMOUS_UID_LEN);
        assert_ne!(a.uid, b.uid);
    }

    #[test]
    fn test_display_label_fallbacks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = UserProfile::anonymous(&mut rng);
        assert_eq!(p.display_label(), "User");

        p.email = Some("someone@example.test".into());
        assert_eq!(p.display_label(), "someone@example.test");

        p.display_name = Some("Sam".into());
        assert_eq!(p.display_label(), "Sam");
    }

    #[test]
    fn test_map_style_serde() {
        assert_eq!(serde_json::to_string(&MapStyle::Satellite).unwrap(), "\"satellite\"");
        let id: UserId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id, UserId::new("abc"));
    }
}
