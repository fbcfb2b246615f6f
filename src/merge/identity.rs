// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Identity resolution.
//!
//! Two records describe the same logical item when their names are equal,
//! byte for byte, leading dot included. Type is never part of the identity:
//! an item reported as a file by one source and as a folder by another is
//! still one item, just an inconsistent one.
//!
//! Some sources name an item from both ends. The manifest and the config
//! index declare a repository side name and a home side name, and either one
//! may match a row. [`JoinKeys`] exposes those candidate names.

use crate::source::{
    home::HomeRecord, index::IndexRecord, manifest::ManifestRecord, repo::RepoRecord,
};

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Join key shared by all sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check if a candidate name resolves to this identity.
    pub fn matches(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Display for Identity {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Candidate identities of a record.
///
/// The primary key is tried first. It defaults to the repository side key,
/// matching the repository being the base of every merge.
pub trait JoinKeys {
    fn repo_key(&self) -> Option<&str>;
    fn home_key(&self) -> Option<&str>;

    /// Preferred identity when joining or starting a new row.
    fn primary_key(&self) -> Option<&str> {
        self.repo_key().or(self.home_key())
    }
}

impl JoinKeys for RepoRecord {
    fn repo_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn home_key(&self) -> Option<&str> {
        None
    }
}

impl JoinKeys for HomeRecord {
    fn repo_key(&self) -> Option<&str> {
        None
    }

    fn home_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl JoinKeys for ManifestRecord {
    fn repo_key(&self) -> Option<&str> {
        self.name_rp.as_deref()
    }

    fn home_key(&self) -> Option<&str> {
        self.name_hm.as_deref()
    }

    // Link sources are repository paths, often without the leading dot.
    fn primary_key(&self) -> Option<&str> {
        self.home_key().or(self.repo_key())
    }
}

impl JoinKeys for IndexRecord {
    fn repo_key(&self) -> Option<&str> {
        self.name_rp.as_deref()
    }

    fn home_key(&self) -> Option<&str> {
        self.name_hm.as_deref()
    }
}
