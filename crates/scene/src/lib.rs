pub mod manager;
pub mod selection;
pub mod view;

pub use manager::*;
pub use selection::*;
pub use view::*;
