pub mod cli;
pub mod config;
pub mod git;
pub mod gomod;
pub mod http;
pub mod manifest;
pub mod model;
pub mod resolver;
pub mod upgrade;

mod api;

#[cfg(test)]
mod testing;

pub use api::{GoUpgrader, GoUpgraderBuilder};
