//! The horizontally repeating SVG overlay.
//!
//! [`compose`] builds the element structure once at mount time;
//! [`ViewportSynchronizer`] keeps it aligned with the host map every frame.

mod composer;
mod session;
mod sync;

pub use composer::{compose, INNER_CLASS, ROOT_CLASS};
pub use session::{OverlayHandles, OverlayLayout, OverlaySession};
pub use sync::{
    compute_viewbox, wrap_shift, FrameOutcome, FrameState, ViewportSynchronizer, WrapShift,
};
