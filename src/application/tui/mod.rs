pub mod calendar;
pub mod input;
pub mod popup;
pub mod theme;

pub use calendar::*;
pub use input::*;
pub use popup::*;
pub use theme::*;
