pub mod listeners;
pub mod logging;

#[cfg(test)]
pub mod test_utils;

pub use listeners::*;
pub use logging::*;
