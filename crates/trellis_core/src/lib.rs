//! # Trellis Core
//!
//! Geometry and layout primitives shared by every Trellis crate.
//!
//! ## Layout contract
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  LayoutParameters + available size  →  resolved size     │
//! │                                                          │
//! │  Px(n)      → n                                          │
//! │  Percent(p) → available · p / 100   (content if unbounded)│
//! │  Content    → natural content size                       │
//! │  Stretch    → available             (content if unbounded)│
//! │                                                          │
//! │  then clamp to [min, max] and never below zero           │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod alignment;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod length;

pub use alignment::{Alignment, Direction, Orientation, SimpleRotation};
pub use edges::Edges;
pub use error::{CoreError, CoreResult};
pub use geometry::{Bounds, PixelRect, Vec2};
pub use length::{LayoutParameters, Length};
