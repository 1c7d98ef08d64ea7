#![forbid(unsafe_code)]
//! Maintenance toolkit for Xcode projects.
//!
//! Registers source files in a `project.pbxproj` manifest, removes doubly
//! registered build files, lists files on disk the project does not know
//! about, and fills missing languages in `.xcstrings` string catalogs.
//!
//! The manifest is edited as text: sections are located by their
//! `/* Begin X section */` markers and new entries are spliced in, so bytes
//! outside an edit are preserved exactly.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xcpatch::{AddFileRequest, AddOptions, IdGenerator, Manifest, add_files, traits::Document};
//!
//! let path = "App.xcodeproj/project.pbxproj";
//! let mut manifest = Manifest::read_from(path)?;
//! let report = add_files(
//!     &mut manifest,
//!     &[AddFileRequest::new("Features/Rides/RideCard.swift")],
//!     &mut IdGenerator::new(),
//!     &AddOptions::new(),
//! );
//! if report.changed() {
//!     manifest.write_to(path)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Operations
//!
//! - **add files**: file reference, build file, group child and build phase member
//! - **dedup**: keep the first build file per file name and phase
//! - **missing**: gitignore-aware scan for unregistered sources
//! - **localize**: fill languages from a translation table, falling back to the source text
//! - **prune**: drop catalog keys no source file mentions

pub mod catalog;
pub mod config;
pub mod error;
pub mod identifier;
pub mod manifest;
pub mod traits;
pub mod walk;

// Re-export most used types for easy consumption
pub use crate::{
    catalog::{
        AugmentOptions, AugmentReport, Catalog, PruneReport, TranslationTable, augment,
        prune_unreferenced,
    },
    config::Config,
    error::Error,
    identifier::{IdGenerator, ObjectId},
    manifest::{
        Manifest,
        dedup::{DedupOptions, DedupReport, deduplicate, deduplicate_with},
        missing::{UnregisteredFile, find_unregistered},
        mutator::{AddFileRequest, AddOptions, AddReport, add_files},
    },
    walk::{SourceFile, WalkOptions, collect_files},
};
