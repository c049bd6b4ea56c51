//! Settings shared by the LendHero bootstrap crates.

pub mod settings;

pub use settings::{DatabaseSettings, Environment, LoadOptions, LogFormat, Settings};
