//! Key bindings: a typed table from `(key, event kind)` to a force action.
//!
//! Raw window events are translated into [`KeySymbol`] and [`EventKind`]
//! outside this crate. Keys are case-insensitive; unbound pairs are no-ops.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::body::BodyHandle;

/// Normalised (lowercase) key symbol such as `"w"` or `"space"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeySymbol(String);

impl KeySymbol {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for KeySymbol {
    fn from(symbol: String) -> Self {
        Self::new(&symbol)
    }
}

impl From<KeySymbol> for String {
    fn from(key: KeySymbol) -> Self {
        key.0
    }
}

impl From<&str> for KeySymbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Press,
    Release,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Press => f.write_str("KeyPress"),
            EventKind::Release => f.write_str("KeyRelease"),
        }
    }
}

/// Unrecognised event kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind {0:?} (expected press or release)")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "press" | "keypress" | "down" => Ok(EventKind::Press),
            "release" | "keyrelease" | "up" => Ok(EventKind::Release),
            _ => Err(ParseEventKindError(s.to_string())),
        }
    }
}

/// Zero-argument action run when a binding fires.
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// Binding table. Rebinding a pair replaces the previous action.
#[derive(Clone, Default)]
pub struct Bindings {
    actions: HashMap<(KeySymbol, EventKind), Action>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<F>(&mut self, key: impl Into<KeySymbol>, kind: EventKind, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.actions.insert((key.into(), kind), Arc::new(action));
    }

    pub fn is_bound(&self, key: &KeySymbol, kind: EventKind) -> bool {
        self.actions.contains_key(&(key.clone(), kind))
    }

    /// Run the action bound to `(key, kind)`. Returns whether one ran.
    pub fn dispatch(&self, key: &KeySymbol, kind: EventKind) -> bool {
        match self.actions.get(&(key.clone(), kind)) {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Press sets the axis force to `value`, release sets it back to zero.
    pub fn bind_axis(&mut self, key: impl Into<KeySymbol>, handle: &BodyHandle, axis: Axis, value: f64) {
        let key = key.into();
        let on_press = handle.clone();
        self.bind(key.clone(), EventKind::Press, move || axis.set(&on_press, value));
        let on_release = handle.clone();
        self.bind(key, EventKind::Release, move || axis.set(&on_release, 0.0));
    }

    /// WASD steering for one body: `w`/`s` push along -y/+y, `a`/`d`
    /// along -x/+x (screen coordinates, y down).
    pub fn wasd(handle: &BodyHandle, magnitude: f64) -> Self {
        let mut bindings = Self::new();
        bindings.bind_axis("w", handle, Axis::Y, -magnitude);
        bindings.bind_axis("s", handle, Axis::Y, magnitude);
        bindings.bind_axis("a", handle, Axis::X, -magnitude);
        bindings.bind_axis("d", handle, Axis::X, magnitude);
        bindings
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.actions.keys().collect();
        keys.sort();
        f.debug_struct("Bindings").field("bound", &keys).finish()
    }
}

/// Force component a binding writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn set(self, handle: &BodyHandle, value: f64) {
        match self {
            Axis::X => handle.set_force_x(value),
            Axis::Y => handle.set_force_y(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Bodies, Body, BodySpec};
    use crate::types::{BodyId, Color};
    use glam::DVec2;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_body() -> Bodies {
        let body = Body::new(BodySpec {
            mass: 1.0,
            radius: 15.0,
            color: Color::new("blue"),
            position: DVec2::new(50.0, 50.0),
            velocity: DVec2::ZERO,
        })
        .unwrap();
        Bodies::build(vec![body]).0
    }

    #[test]
    fn test_event_kind_parse_and_display() {
        assert_eq!("press".parse::<EventKind>().unwrap(), EventKind::Press);
        assert_eq!("KeyRelease".parse::<EventKind>().unwrap(), EventKind::Release);
        assert!("hold".parse::<EventKind>().is_err());
        assert_eq!(EventKind::Press.to_string(), "KeyPress");
    }

    #[test]
    fn test_key_symbol_is_case_insensitive() {
        assert_eq!(KeySymbol::new("W"), KeySymbol::new("w"));
        let key: KeySymbol = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(key.as_str(), "d");
    }

    #[test]
    fn test_unbound_dispatch_is_noop() {
        let bindings = Bindings::new();
        assert!(!bindings.dispatch(&KeySymbol::new("q"), EventKind::Press));
    }

    #[test]
    fn test_dispatch_runs_bound_action_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut bindings = Bindings::new();
        bindings.bind("e", EventKind::Press, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bindings.dispatch(&KeySymbol::new("E"), EventKind::Press));
        assert!(!bindings.dispatch(&KeySymbol::new("e"), EventKind::Release));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wasd_sets_and_clears_force() {
        let bodies = one_body();
        let handle = bodies.handle(BodyId(0)).unwrap();
        let bindings = Bindings::wasd(&handle, 5.0);
        assert_eq!(bindings.len(), 8);

        bindings.dispatch(&"w".into(), EventKind::Press);
        assert_eq!(handle.body().force(), DVec2::new(0.0, -5.0));
        bindings.dispatch(&"d".into(), EventKind::Press);
        assert_eq!(handle.body().force(), DVec2::new(5.0, -5.0));
        bindings.dispatch(&"w".into(), EventKind::Release);
        assert_eq!(handle.body().force(), DVec2::new(5.0, 0.0));
    }

    #[test]
    fn test_wasd_fires_with_caps_lock() {
        let bodies = one_body();
        let handle = bodies.handle(BodyId(0)).unwrap();
        let bindings = Bindings::wasd(&handle, 5.0);

        assert!(bindings.dispatch(&KeySymbol::new("W"), EventKind::Press));
        assert_eq!(handle.body().force(), DVec2::new(0.0, -5.0));
        assert!(bindings.dispatch(&KeySymbol::new("W"), EventKind::Release));
        assert_eq!(handle.body().force(), DVec2::ZERO);
    }
}
