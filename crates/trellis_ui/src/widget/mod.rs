//! Concrete views.
//!
//! | Widget | Children | Layout |
//! |--------|----------|--------|
//! | [`Spacer`] | none | its own layout only |
//! | [`Image`] | none | sprite size, fitted and scaled |
//! | [`Label`] | none | measured text, wrapped |
//! | [`Lane`] | many | one after another along an axis |
//! | [`Panel`] | many | stacked, each aligned on its own |
//! | [`Frame`] | one | border and background around the content |
//! | [`ScrollContainer`] | one | clipped, offset by the scroll position |
//! | [`PaginatedMenu`] | pages | one page at a time between arrows |
//! | [`KeybindEditor`] | one | keybind text, opens a capture overlay |

mod frame;
mod image;
mod keybind_editor;
mod label;
mod lane;
mod paginated;
mod panel;
mod scroll;
mod spacer;

pub use frame::Frame;
pub use image::{Image, ImageFit};
pub use keybind_editor::KeybindEditor;
pub use label::Label;
pub use lane::Lane;
pub use paginated::PaginatedMenu;
pub use panel::Panel;
pub use scroll::{ScrollContainer, DEFAULT_SCROLL_STEP};
pub use spacer::Spacer;
