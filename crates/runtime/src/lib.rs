pub mod deferred;
pub mod event_bus;
pub mod input;

pub use deferred::*;
pub use event_bus::*;
pub use input::*;
