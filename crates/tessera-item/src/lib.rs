#![forbid(unsafe_code)]

//! Item: per-box positioning and transition control.
//!
//! # Role in Tessera
//! A layout engine decides where boxes go; `tessera-item` moves them there.
//! Each [`Item`] owns one [`Element`], tracks its logical position, and runs
//! the transition state machine that waits for the environment's completion
//! signal before settling the box into its final styling.
//!
//! # Primary responsibilities
//! - **Positioning**: instant moves, animated moves, and reading the
//!   on-screen position back from computed styles.
//! - **Transitions**: one in-flight transition per item, callback-once
//!   completion, bubbled-signal filtering, and full style cleanup.
//! - **Lifecycle**: reveal, remove (detach after the exit animation), and
//!   destroy.
//!
//! # Example
//!
//! ```
//! use tessera_core::caps::AnimationCapabilities;
//! use tessera_core::options::{LayoutOptions, OptionsStore};
//! use tessera_core::signal::SignalKind;
//! use tessera_item::{Item, ItemContext, MemoryElement};
//!
//! let options = OptionsStore::shared(LayoutOptions::default().with_padding((10, 10)));
//! let ctx = ItemContext::new(AnimationCapabilities::standard(), options);
//! let mut item = Item::new(MemoryElement::new(), ctx);
//! item.layout_position();
//!
//! item.transition_to_position(50, 20);
//! assert_eq!(item.element().style("transform"), Some("translate(50px, 20px)"));
//!
//! let signal = item.element().signal(SignalKind::TransitionEnd);
//! assert!(item.handle_signal(signal));
//! assert_eq!(item.element().style("left"), Some("60px"));
//! assert_eq!(item.element().style("transform"), None);
//! ```

pub mod clock;
pub mod element;
pub mod item;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use element::{Element, MemoryElement};
pub use item::{Item, ItemContext};
pub use transition::{OnComplete, TransitionState};
