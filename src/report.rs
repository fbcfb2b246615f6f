// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Report ordering and presentation filters.
//!
//! The report keeps the ordering the config index declares, at the level of
//! category groups. Rows are sorted by:
//!
//! 1. Group key, i.e., the smallest original sort position among rows sharing
//!    the same primary and secondary category.
//! 2. Unsynced items after synced and local ones.
//! 3. Untracked items after tracked ones.
//! 4. Original sort position.
//!
//! Identity breaks any remaining tie, so ordering is fully deterministic.
//! After sorting, every row learns its final position.

pub mod export;
pub mod markdown;

use crate::{
    source::DotStruc,
    status::{DotState, ReportRow},
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Placeholder primary category of rows without one.
pub const UNCATEGORIZED_1: &str = "__uncat_1__";

/// Placeholder secondary category of rows without one.
pub const UNCATEGORIZED_2: &str = "__uncat_2__";

/// Filter on status match result.
///
/// Showing only matched rows and showing only unmatched rows are mutually
/// exclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchFilter {
    #[default]
    All,
    Matched,
    Unmatched,
}

impl MatchFilter {
    pub fn accepts(self, status_result: bool) -> bool {
        match self {
            Self::All => true,
            Self::Matched => status_result,
            Self::Unmatched => !status_result,
        }
    }
}

/// Independently toggleable presentation filters.
///
/// Everything is disabled by default, yielding the full report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Hide rows the config index flags as "do not show".
    pub hide_no_shows: bool,

    /// Hide rows declared as linked from repository into home.
    pub hide_full_matches: bool,

    /// Hide rows declaring any structural relationship.
    pub hide_full_and_only: bool,
    pub match_result: MatchFilter,
}

impl FilterSettings {
    pub fn accepts(&self, row: &ReportRow) -> bool {
        let dot_struc = row.item.dot_struc();

        if self.hide_no_shows && row.item.no_show() {
            return false;
        }

        if self.hide_full_matches && dot_struc == Some(DotStruc::RepoToHome) {
            return false;
        }

        if self.hide_full_and_only && dot_struc.is_some() {
            return false;
        }

        self.match_result.accepts(row.matching.status_result)
    }
}

/// Ordered and filtered report rows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn find(&self, name: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count rows per dot state.
    pub fn state_counts(&self) -> [(DotState, usize); 3] {
        [DotState::Synced, DotState::Local, DotState::NoSym]
            .map(|state| (state, self.rows.iter().filter(|row| row.dot_state == state).count()))
    }
}

/// Filter rows, then order what is left.
#[instrument(skip(rows, filter), level = "debug")]
pub fn build_report(rows: Vec<ReportRow>, filter: &FilterSettings) -> ReportTable {
    let rows = filter_rows(rows, filter);
    ReportTable {
        rows: sort_rows(rows),
    }
}

/// Drop rows rejected by any enabled filter.
pub fn filter_rows(mut rows: Vec<ReportRow>, filter: &FilterSettings) -> Vec<ReportRow> {
    let before = rows.len();
    rows.retain(|row| filter.accepts(row));
    debug!("filtered out {} of {before} report rows", before - rows.len());
    rows
}

/// Order rows for presentation and assign final positions.
pub fn sort_rows(mut rows: Vec<ReportRow>) -> Vec<ReportRow> {
    let mut group_keys: HashMap<(String, String), i64> = HashMap::new();
    for row in &rows {
        group_keys
            .entry(group_of(row))
            .and_modify(|key| *key = (*key).min(row.item.sort_orig))
            .or_insert(row.item.sort_orig);
    }

    // INVARIANT: Every row's group has a key, because keys were collected
    // from these very rows.
    let mut keyed = rows
        .drain(..)
        .map(|row| {
            let group_key = group_keys
                .get(&group_of(&row))
                .copied()
                .unwrap_or(row.item.sort_orig);
            (group_key, row)
        })
        .collect::<Vec<_>>();

    keyed.sort_by(|(a_key, a), (b_key, b)| {
        a_key
            .cmp(b_key)
            .then_with(|| a.nosym_sort.cmp(&b.nosym_sort))
            .then_with(|| untracked_key(a).cmp(&untracked_key(b)))
            .then_with(|| a.item.sort_orig.cmp(&b.item.sort_orig))
            .then_with(|| a.item.identity.cmp(&b.item.identity))
    });

    keyed
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut row))| {
            row.sort_out = position as i64;
            row
        })
        .collect()
}

fn group_of(row: &ReportRow) -> (String, String) {
    (
        row.item.cat_1().unwrap_or(UNCATEGORIZED_1).to_string(),
        row.item.cat_2().unwrap_or(UNCATEGORIZED_2).to_string(),
    )
}

fn untracked_key(row: &ReportRow) -> u8 {
    u8::from(row.item.git_rp() == Some(false))
}
