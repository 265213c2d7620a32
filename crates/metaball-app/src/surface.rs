//! Retained-mode canvas surface.
//!
//! `draw` adds an item and returns its id, `erase` removes an item by id,
//! and `end_frame` publishes the items currently on the canvas.

use metaball_core::types::BodySnapshot;
use metaball_sim::RenderSurface;

use crate::state::{Frame, LatestFrame};

/// Canvas item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(usize);

pub struct CanvasSurface {
    items: Vec<Option<BodySnapshot>>,
    free: Vec<usize>,
    frames: u64,
    latest: LatestFrame,
}

impl CanvasSurface {
    pub fn new(latest: LatestFrame) -> Self {
        Self {
            items: Vec::new(),
            free: Vec::new(),
            frames: 0,
            latest,
        }
    }

    /// Number of live items on the canvas.
    pub fn item_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_some()).count()
    }
}

impl RenderSurface for CanvasSurface {
    type Handle = ItemId;

    fn draw(&mut self, body: &BodySnapshot) -> ItemId {
        match self.free.pop() {
            Some(slot) => {
                self.items[slot] = Some(body.clone());
                ItemId(slot)
            }
            None => {
                self.items.push(Some(body.clone()));
                ItemId(self.items.len() - 1)
            }
        }
    }

    fn erase(&mut self, handle: ItemId) {
        if let Some(item) = self.items.get_mut(handle.0) {
            if item.take().is_some() {
                self.free.push(handle.0);
            }
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        let mut bodies: Vec<BodySnapshot> = self.items.iter().flatten().cloned().collect();
        bodies.sort_by_key(|body| body.id);
        let frame = Frame {
            number: self.frames,
            bodies,
        };

        if let Ok(mut lock) = self.latest.lock() {
            *lock = Some(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use glam::DVec2;
    use metaball_core::types::{BodyId, Color};

    fn snapshot(id: usize, x: f64) -> BodySnapshot {
        BodySnapshot {
            id: BodyId(id),
            position: DVec2::new(x, 0.0),
            velocity: DVec2::ZERO,
            radius: 2.0,
            color: Color::new("blue"),
        }
    }

    #[test]
    fn test_erase_then_draw_reuses_slot() {
        let state = AppState::new();
        let mut canvas = CanvasSurface::new(state.latest_frame.clone());

        let first = canvas.draw(&snapshot(0, 1.0));
        canvas.erase(first);
        let second = canvas.draw(&snapshot(0, 2.0));

        assert_eq!(first, second);
        assert_eq!(canvas.item_count(), 1);
    }

    #[test]
    fn test_double_erase_is_harmless() {
        let state = AppState::new();
        let mut canvas = CanvasSurface::new(state.latest_frame.clone());
        let item = canvas.draw(&snapshot(0, 1.0));
        canvas.erase(item);
        canvas.erase(item);
        canvas.draw(&snapshot(0, 1.0));
        canvas.draw(&snapshot(1, 1.0));
        assert_eq!(canvas.item_count(), 2);
    }

    #[test]
    fn test_end_frame_publishes_bodies_in_order() {
        let state = AppState::new();
        let mut canvas = CanvasSurface::new(state.latest_frame.clone());
        let a = canvas.draw(&snapshot(0, 1.0));
        canvas.draw(&snapshot(1, 5.0));
        canvas.erase(a);
        canvas.draw(&snapshot(0, 3.0));
        canvas.end_frame();

        let frame = state.latest().unwrap();
        assert_eq!(frame.number, 1);
        assert_eq!(
            frame.bodies.iter().map(|b| b.position.x).collect::<Vec<_>>(),
            vec![3.0, 5.0]
        );
    }
}
