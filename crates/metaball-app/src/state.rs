//! Application state shared between the render loop and the console.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use metaball_core::types::BodySnapshot;

/// One published frame: every body drawn during a render step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub number: u64,
    pub bodies: Vec<BodySnapshot>,
}

/// Latest frame for synchronous polling. `None` until the first frame.
pub type LatestFrame = Arc<Mutex<Option<Frame>>>;

#[derive(Debug, Default)]
pub struct AppState {
    pub latest_frame: LatestFrame,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Frame> {
        self.latest_frame.lock().ok().and_then(|frame| frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.latest().is_none());

        *state.latest_frame.lock().unwrap() = Some(Frame {
            number: 3,
            bodies: Vec::new(),
        });
        assert_eq!(state.latest().unwrap().number, 3);
    }
}
