use trellis_core::{LayoutParameters, Vec2};

use crate::render::SpriteBatch;
use crate::view::{View, ViewState};

/// An empty view that only occupies layout space.
#[derive(Debug)]
pub struct Spacer {
    state: ViewState,
}

impl Spacer {
    /// Creates a spacer with the given layout.
    #[must_use]
    pub fn new(layout: LayoutParameters) -> Self {
        Self {
            state: ViewState::new("Spacer").with_layout(layout),
        }
    }
}

impl View for Spacer {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        self.state.layout().resolve(available, Vec2::ZERO)
    }

    fn on_draw_content(&self, _batch: &mut dyn SpriteBatch) {}
}
