//! Systems - logic that operates on components

mod crafting;
mod events;
mod inspection;
mod metabolism;

pub use crafting::*;
pub use events::*;
pub use inspection::*;
pub use metabolism::*;
