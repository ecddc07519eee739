pub mod config;
pub mod projection;

pub use config::*;
pub use projection::*;
