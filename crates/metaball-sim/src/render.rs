//! Render step and the rendering surface it draws on.
//!
//! Every frame each body is erased and drawn again from a fresh snapshot.
//! There is no diffing.

use metaball_core::body::Bodies;
use metaball_core::types::BodySnapshot;

/// Opaque drawing target (a canvas, a frame buffer, a recorder).
pub trait RenderSurface: Send + 'static {
    /// Whatever the surface needs to remove a drawn body later.
    type Handle: Send;

    fn draw(&mut self, body: &BodySnapshot) -> Self::Handle;

    fn erase(&mut self, handle: Self::Handle);

    /// Called once after every body has been redrawn.
    fn end_frame(&mut self) {}
}

/// Draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    type Handle = ();

    fn draw(&mut self, _body: &BodySnapshot) {}

    fn erase(&mut self, _handle: ()) {}
}

pub struct RenderStep<S: RenderSurface> {
    bodies: Bodies,
    surface: S,
    handles: Vec<Option<S::Handle>>,
}

impl<S: RenderSurface> RenderStep<S> {
    pub fn new(bodies: Bodies, surface: S) -> Self {
        let handles = (0..bodies.len()).map(|_| None).collect();
        Self {
            bodies,
            surface,
            handles,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn step(&mut self) {
        for (id, body) in self.bodies.iter() {
            if let Some(handle) = self.handles[id.0].take() {
                self.surface.erase(handle);
            }
            let snapshot = body.snapshot(id);
            self.handles[id.0] = Some(self.surface.draw(&snapshot));
        }
        self.surface.end_frame();
    }
}
