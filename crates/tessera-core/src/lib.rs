#![forbid(unsafe_code)]

//! Core: geometry, animation capabilities, completion signals, style maps,
//! and layout options.
//!
//! # Role in Tessera
//! `tessera-core` holds the collaborators a positioned item leans on but
//! does not own: the occupied-space [`geometry::Rect`], the process-wide
//! [`caps::AnimationCapabilities`], the closed set of completion
//! [`signal::SignalKind`]s, and the shared [`options::OptionsStore`].
//!
//! # How it fits in the system
//! `tessera-item` builds the per-box controller on top of these types. A
//! layout engine creates one [`options::OptionsStore`], installs the probed
//! capabilities once, and hands both to every item it creates.

pub mod caps;
pub mod geometry;
pub mod logging;
pub mod options;
pub mod signal;
pub mod style;

pub use caps::{AnimationCapabilities, AnimationFeatures, VendorPrefix};
pub use geometry::{Point, Rect, Sides};
pub use options::{LayoutOptions, OptionsError, OptionsStore, TransitionDuration};
pub use signal::{ElementId, Signal, SignalKind};
pub use style::StyleMap;
