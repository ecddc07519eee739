//! Hover/click bridge and session state for an interactive scatter plot.
//!
//! [`Session`] owns the active view, the cluster selection and the display
//! modes. It is the only place that talks to the renderer and the hover panel.

pub mod bridge;
pub mod input;
pub mod panel;
pub mod session;

pub use bridge::*;
pub use input::*;
pub use panel::*;
pub use session::*;
