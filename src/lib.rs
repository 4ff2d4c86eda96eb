pub mod application;
pub mod entities;
pub mod infrastructure;
pub mod picker;

pub use application::*;
pub use entities::*;
pub use infrastructure::*;
pub use picker::*;
