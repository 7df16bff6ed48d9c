//! Theme preference store.
//!
//! A two-valued state machine whose value, its persisted copy, and the
//! presentation surface are updated together: a caller observing the sink
//! immediately after `toggle()` or `set()` returns always sees the new
//! theme. The sink is a port — in a browser-like host it toggles a class on
//! the document root, in a terminal host it may restyle the palette, and in
//! tests it just records.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, THEME_KEY};

// ============================================================================
// Theme
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Lenient parse for config values; anything unrecognized is `Light`.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Persisted shape under the `theme-preference` key.
#[derive(Debug, Serialize, Deserialize)]
struct ThemePayload {
    theme: Theme,
}

// ============================================================================
// Presentation Sink
// ============================================================================

/// Presentation port invoked synchronously on every theme change and on
/// rehydration, before the mutating call returns.
pub trait ThemeSink: Send + Sync {
    fn apply(&self, theme: Theme);
}

/// Sink for hosts with no presentation surface.
pub struct NullSink;

impl ThemeSink for NullSink {
    fn apply(&self, _theme: Theme) {}
}

// ============================================================================
// ThemeStore
// ============================================================================

pub struct ThemeStore {
    theme: Theme,
    default: Theme,
    storage: Arc<dyn KeyValueStore>,
    sink: Box<dyn ThemeSink>,
}

impl ThemeStore {
    /// The store starts at `default` with the sink untouched; call
    /// [`rehydrate`](Self::rehydrate) before anything paints.
    pub fn new(storage: Arc<dyn KeyValueStore>, sink: Box<dyn ThemeSink>, default: Theme) -> Self {
        Self {
            theme: default,
            default,
            storage,
            sink,
        }
    }

    pub fn current(&self) -> Theme {
        self.theme
    }

    /// Flip light/dark. Value, sink, and persisted copy move together.
    pub fn toggle(&mut self) -> Theme {
        self.apply(self.theme.flipped())
    }

    /// Set an explicit value. Idempotent when the value is unchanged, but
    /// the sink and persisted copy are still refreshed so all three surfaces
    /// agree even if one drifted.
    pub fn set(&mut self, theme: Theme) -> Theme {
        self.apply(theme)
    }

    /// Restore from persisted storage at startup. Absent or malformed
    /// payloads resolve to the default, and the sink is reconciled before
    /// this returns — the first observable paint is already correct.
    pub fn rehydrate(&mut self) -> Theme {
        let resolved = match self.storage.get(THEME_KEY) {
            Some(raw) => match serde_json::from_str::<ThemePayload>(&raw) {
                Ok(payload) => payload.theme,
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted theme is malformed, using default");
                    self.default
                }
            },
            None => self.default,
        };
        self.theme = resolved;
        self.sink.apply(resolved);
        resolved
    }

    fn apply(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        self.sink.apply(theme);

        let payload = ThemePayload { theme };
        match serde_json::to_string(&payload) {
            Ok(json) => {
                if let Err(e) = self.storage.set(THEME_KEY, &json) {
                    tracing::warn!(error = %e, "Failed to persist theme preference");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize theme preference"),
        }
        theme
    }
}

// ============================================================================
// Tests
// ============================================================================
