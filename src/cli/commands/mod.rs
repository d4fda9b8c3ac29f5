//! CLI command implementations

pub mod build;
pub mod catalog;
pub mod config;
mod inputs;
pub mod layer;
pub mod resolve;

pub use build::execute as build;
pub use catalog::execute as catalog;
pub use config::execute as config;
pub use layer::execute as layer;
pub use resolve::execute as resolve;
