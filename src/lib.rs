// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile reconciliation reports.
//!
//! Dotrep compares four independent views of a user's dotfiles:
//!
//! 1. __Repository__: top-level entries of the public and private dotfile
//!    repositories.
//! 2. __Home__: top-level entries of the home directory.
//! 3. __Manifest__: link directives of the symlink manager manifest.
//! 4. __Config index__: the user's curated CSV catalog of every dotfile.
//!
//! Each run merges these views into one row per logical item, consolidates
//! conflicting fields, derives a synchronization state for every item, flags
//! anything that does not line up, and exports the result as a report. Dotrep
//! only ever reports. It never copies, links, or removes anything.
//!
//! # See Also
//!
//! - [`pipeline::run`] for the full run.
//! - [`status`] for how dot states and alerts are decided.

pub mod config;
pub mod consolidate;
pub mod merge;
pub mod path;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod source;
pub mod status;

#[doc(inline)]
pub use config::Settings;
pub use path::default_config_path;
pub use pipeline::{build_output, load_sources, run, Output};
pub use status::overrides::FixtureMode;
