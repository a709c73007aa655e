//! shmgr - versioned shell library loader
//!
//! Resolves `alias:version` requests to shell library source. Providers
//! advertise one library version each; the highest version per
//! (alias, major) is cached on disk and served from there afterwards.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod ui;
pub mod version;

pub use error::{ShmgrError, ShmgrResult};
