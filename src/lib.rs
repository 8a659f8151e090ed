//! trade-overlay: renders trade-setup records as panel overlays beside their
//! chart images.
//!
//! The crate keeps a strict split between the layout engine (`api`), which
//! turns a record into backend-agnostic drawing commands, and the rasterizer
//! and compositor that turn those commands into pixels.

pub mod api;
#[cfg(feature = "cairo-backend")]
pub mod compositor;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod telemetry;

pub use api::{LayoutStyle, PanelLayout, build_panel_layout};
pub use core::TradeRecord;
pub use error::{OverlayError, OverlayResult};
