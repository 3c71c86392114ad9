//! Windowed view engine.
//!
//! # Responsibility
//! - [`window`]: visible date range and zoom state machine.
//! - [`filter`]: pure visible-set, highlight and connection derivations.
//! - [`controller`]: single-writer coordinator between the store and the
//!   view state, publishing immutable snapshots to the rendering layer.

pub mod clock;
pub mod controller;
pub mod filter;
pub mod snapshot;
pub mod window;
