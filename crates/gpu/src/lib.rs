pub mod atlas;
pub mod renderer;

pub use atlas::*;
pub use renderer::*;
