//! CLI library for testing purposes

pub mod add_file;
pub mod dedup;
pub mod localize;
pub mod missing;
pub mod prune;
pub mod settings;
pub mod validation;

pub use xcpatch::Config;
