pub mod acquisition;
pub mod assembly;
pub mod config;
pub mod generator;
pub mod metadata;
pub mod seeds;
pub mod slots;
pub mod utils;

#[cfg(test)]
mod config_tests;

pub use acquisition::*;
pub use assembly::*;
pub use config::*;
pub use generator::*;
pub use metadata::*;
pub use slots::*;
