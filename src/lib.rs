//! pylayer - CPython version resolution and layer caching for builds
//!
//! Picks the CPython version to install from ranked sources, matches it
//! against a dependency catalog and decides whether the cached layer from a
//! previous build can be reused.

pub mod build;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod install;
pub mod layer;
pub mod refinery;
pub mod report;
pub mod resolve;
pub mod source;
pub mod ui;
pub mod version;

pub use error::{PylayerError, PylayerResult};
