//! Tool registry and the bundled arithmetic tools

pub mod registry;
pub mod tools;
pub mod utils;
