// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Status derivation.
//!
//! Turns every consolidated item into a report row carrying its __dot
//! state__, match results, and alert.
//!
//! # Dot State
//!
//! The dot state classifies how an item is synchronized. It is decided by a
//! small table where the first matching rule wins:
//!
//! | structural hint  | scope      | dot state |
//! |------------------|------------|-----------|
//! | `hm`             | any        | `NoSym`   |
//! | `rp` or `rp>hm`  | private    | `Local`   |
//! | `rp` or `rp>hm`  | other      | `Synced`  |
//! | absent           | private    | `Local`   |
//! | absent           | public     | `Synced`  |
//! | absent           | local      | `NoSym`   |
//! | absent           | absent     | `NoSym`   |

pub mod matching;
pub mod overrides;
pub mod unmatched;

use crate::{
    consolidate::{ItemRecord, MainTable},
    source::{DotStruc, Scope},
    status::matching::{detect_match, MatchReport},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::instrument;

/// Sort position of rows not yet ordered.
pub const UNSORTED: i64 = -1;

/// Synchronization classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotState {
    /// Backed by the private repository.
    Local,

    /// Backed by the public repository.
    Synced,

    /// Not backed by any repository.
    NoSym,
}

impl DotState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Synced => "Synced",
            Self::NoSym => "NoSym",
        }
    }
}

impl Display for DotState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for DotState {
    type Err = crate::source::TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "synced" => Ok(Self::Synced),
            "nosym" => Ok(Self::NoSym),
            _ => Err(crate::source::TokenError::new("dot state", token)),
        }
    }
}

/// Decide dot state from structural hint and scope.
pub fn derive_dot_state(dot_struc: Option<DotStruc>, scope: Option<Scope>) -> DotState {
    match (dot_struc, scope) {
        (Some(DotStruc::Home), _) => DotState::NoSym,
        (Some(DotStruc::Repo | DotStruc::RepoToHome), Some(Scope::Private)) => DotState::Local,
        (Some(DotStruc::Repo | DotStruc::RepoToHome), _) => DotState::Synced,
        (None, Some(Scope::Private)) => DotState::Local,
        (None, Some(Scope::Public)) => DotState::Synced,
        (None, Some(Scope::Local) | None) => DotState::NoSym,
    }
}

/// Secondary sort discriminator pushing unsynced items down.
pub fn nosym_sort(state: DotState) -> u8 {
    u8::from(state == DotState::NoSym)
}

/// Item with its derived status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub item: ItemRecord,
    pub dot_state: DotState,
    pub nosym_sort: u8,
    pub matching: MatchReport,

    /// Alert text, absent when nothing is wrong or when suppressed.
    pub alert: Option<String>,

    /// Final position in the report, or [`UNSORTED`].
    pub sort_out: i64,
}

impl ReportRow {
    /// Derive status of one consolidated item.
    pub fn derive(item: &ItemRecord) -> Self {
        let dot_state = derive_dot_state(item.dot_struc(), item.scope());
        let matching = detect_match(item);

        Self {
            item: item.clone(),
            dot_state,
            nosym_sort: nosym_sort(dot_state),
            alert: matching.alert_text(),
            matching,
            sort_out: UNSORTED,
        }
    }

    pub fn name(&self) -> &str {
        self.item.identity.as_str()
    }
}

/// Derive status of every item in the main table.
#[instrument(skip(main), level = "debug")]
pub fn derive_status(main: &MainTable) -> Vec<ReportRow> {
    main.rows.iter().map(ReportRow::derive).collect()
}
