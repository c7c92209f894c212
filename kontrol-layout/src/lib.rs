//! Layout engine for the Traktor Kontrol F1
//!
//! A layout claims a [`Mask`] of controls, routes their events to
//! press / hold / release handlers and keeps their LEDs in sync with a
//! buffered color map at a fixed refresh rate. Several layouts can share one
//! device, each owning a different part of the surface.

pub mod config;
pub mod error;
pub mod handler;
pub mod mask;
pub mod surface;

mod layout;

pub use config::{LayoutConfig, DEFAULT_EVENT_QUEUE, DEFAULT_HOLD, DEFAULT_REFRESH_HZ};
pub use error::LayoutError;
pub use handler::{HandlerClass, HandlerSlot, HoldHandler, Phase, ValueHandler};
pub use layout::Layout;
pub use mask::{Mask, MaskPreset};
pub use surface::Surface;
